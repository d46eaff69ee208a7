use crate::client::error::ClientError;

/// The finite set of logical backend operations the client can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    ListMessages,
    GetMessage,
    SendMessage,
}

/// Maps each logical operation to its backend routing id. Validated when the
/// client is constructed, so an unmapped name fails at startup rather than at
/// call time.
#[derive(Debug, Clone)]
pub struct FunctionIds {
    pub list_messages: String,
    pub get_message: String,
    pub send_message: String,
}

impl Default for FunctionIds {
    fn default() -> Self {
        Self {
            list_messages: "getlstfn".to_string(),
            get_message: "getmsgfn".to_string(),
            send_message: "pstmsgfn".to_string(),
        }
    }
}

impl FunctionIds {
    pub fn validate(&self) -> Result<(), ClientError> {
        for (name, id) in [
            ("listMessages", &self.list_messages),
            ("getMessage", &self.get_message),
            ("sendMessage", &self.send_message),
        ] {
            if id.is_empty() {
                return Err(ClientError::Config(format!(
                    "no function id mapped for '{}'",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn resolve(&self, function: Function) -> &str {
        match function {
            Function::ListMessages => &self.list_messages,
            Function::GetMessage => &self.get_message,
            Function::SendMessage => &self.send_message,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. "http://localhost:3000". No trailing slash.
    pub base_url: String,
    pub application_id: String,
    /// Bucket attachment uploads go into.
    pub bucket: String,
    /// Where the magic-link callback should land, supplied by the
    /// presentation layer.
    pub redirect_url: String,
    pub functions: FunctionIds,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ids_resolve() {
        let ids = FunctionIds::default();
        assert!(ids.validate().is_ok());
        assert_eq!(ids.resolve(Function::ListMessages), "getlstfn");
        assert_eq!(ids.resolve(Function::GetMessage), "getmsgfn");
        assert_eq!(ids.resolve(Function::SendMessage), "pstmsgfn");
    }

    #[test]
    fn empty_mapping_fails_validation() {
        let ids = FunctionIds {
            get_message: String::new(),
            ..FunctionIds::default()
        };
        let err = ids.validate().unwrap_err();
        assert!(err.to_string().contains("getMessage"));
    }
}
