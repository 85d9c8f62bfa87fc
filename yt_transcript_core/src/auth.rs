use std::collections::HashMap;

/// Key/value credentials handed to a connector.
pub type AuthDetails = HashMap<String, String>;
