//! Contacts command.

use clap::Args;
use std::path::{Path, PathBuf};
use talentwire_core::{BusinessUnit, ChannelKind, ContactInfo};
use talentwire_engine::ContactDirectory;

/// Default contacts file, used when the config names none.
const DEFAULT_CONTACTS: &str = "contacts.json";

/// Contacts command arguments.
#[derive(Args)]
pub struct ContactsArgs {
    #[command(subcommand)]
    pub command: ContactsCommand,
}

#[derive(clap::Subcommand)]
pub enum ContactsCommand {
    /// List contacts in a business unit
    List {
        /// Business unit name
        unit: String,
    },

    /// Add or update a contact
    Add {
        /// Contact ID
        id: String,

        /// Business unit
        #[arg(short, long)]
        unit: String,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,

        /// Phone in E.164 form
        #[arg(long)]
        phone: Option<String>,

        /// Email address
        #[arg(long)]
        email: Option<String>,

        /// Telegram chat ID
        #[arg(long)]
        telegram: Option<String>,

        /// Slack member ID
        #[arg(long)]
        slack: Option<String>,

        /// Teams user ID
        #[arg(long)]
        teams: Option<String>,

        /// Preferred channel
        #[arg(long)]
        prefer: Option<String>,
    },

    /// Remove a contact
    Remove {
        /// Contact ID
        id: String,
    },
}

fn contacts_path(config_path: &Path) -> anyhow::Result<PathBuf> {
    let config = super::load_config(config_path)?;
    Ok(config
        .contacts_file
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTACTS)))
}

fn open_directory(path: &Path) -> anyhow::Result<ContactDirectory> {
    if path.exists() {
        Ok(ContactDirectory::load(path)?)
    } else {
        Ok(ContactDirectory::new())
    }
}

/// Run a contacts subcommand against the configured contacts file.
pub async fn run(config_path: &Path, args: ContactsArgs) -> anyhow::Result<()> {
    let path = contacts_path(config_path)?;

    match args.command {
        ContactsCommand::List { unit } => {
            let directory = open_directory(&path)?;
            let contacts = directory.list(&BusinessUnit::new(&unit)).await;
            if contacts.is_empty() {
                println!("no contacts in unit {}", unit);
                return Ok(());
            }
            for contact in contacts {
                let name = contact.name.as_deref().unwrap_or("-");
                let channels: Vec<&str> = contact
                    .available_channels()
                    .into_iter()
                    .map(|k| k.as_str())
                    .collect();
                println!("{:<20} {:<24} [{}]", contact.id, name, channels.join(", "));
            }
        }

        ContactsCommand::Add {
            id,
            unit,
            name,
            phone,
            email,
            telegram,
            slack,
            teams,
            prefer,
        } => {
            let mut contact = ContactInfo::new(id.as_str(), BusinessUnit::new(&unit));
            if let Some(name) = name {
                contact = contact.with_name(name);
            }
            if let Some(phone) = phone {
                contact = contact.with_phone(phone);
            }
            if let Some(email) = email {
                contact = contact.with_email(email);
            }
            if let Some(chat_id) = telegram {
                contact = contact.with_telegram(chat_id);
            }
            if let Some(user_id) = slack {
                contact = contact.with_slack(user_id);
            }
            if let Some(user_id) = teams {
                contact = contact.with_teams(user_id);
            }
            if let Some(prefer) = prefer {
                let kind = ChannelKind::parse(&prefer)
                    .ok_or_else(|| anyhow::anyhow!("invalid channel: {}", prefer))?;
                contact = contact.prefer(kind);
            }

            let directory = open_directory(&path)?;
            directory.upsert(contact).await;
            directory.save(&path).await?;
            println!("saved {} to {}", id, path.display());
        }

        ContactsCommand::Remove { id } => {
            let directory = open_directory(&path)?;
            match directory.remove(&id.as_str().into()).await {
                Some(_) => {
                    directory.save(&path).await?;
                    println!("removed {}", id);
                }
                None => anyhow::bail!("no such contact: {}", id),
            }
        }
    }

    Ok(())
}
