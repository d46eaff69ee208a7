use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub objects_dir: PathBuf,
    pub max_upload_size_bytes: u64,
    pub application_id: String,
    pub functions: FunctionRoutes,
}

/// Routing ids the generic function-run endpoint dispatches on.
#[derive(Clone, Debug)]
pub struct FunctionRoutes {
    pub list_messages: String,
    pub get_message: String,
    pub send_message: String,
}

impl Config {
    pub fn from_env() -> Self {
        let data_dir = PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "App_Data".into()));
        let db_path = data_dir.join("minibox.sqlite");
        let objects_dir = data_dir.join("objects");
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);
        let max_upload_size_bytes = env::var("MAX_UPLOAD_SIZE_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10_485_760);
        let application_id = env::var("APPLICATION_ID").unwrap_or_else(|_| "inboxapp".into());

        let functions = FunctionRoutes {
            list_messages: env::var("FN_LIST_MESSAGES").unwrap_or_else(|_| "getlstfn".into()),
            get_message: env::var("FN_GET_MESSAGE").unwrap_or_else(|_| "getmsgfn".into()),
            send_message: env::var("FN_SEND_MESSAGE").unwrap_or_else(|_| "pstmsgfn".into()),
        };

        Self {
            port,
            data_dir,
            db_path,
            objects_dir,
            max_upload_size_bytes,
            application_id,
            functions,
        }
    }
}
