//! Empty library target; the real content lives under `tests/`.
