use std::path::PathBuf;

pub(crate) const DB_ENV: &str = "ANYRSS_DB";
pub(crate) const ADDR_ENV: &str = "ANYRSS_ADDR";

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:10086";
const DEFAULT_LIST_LIMIT: usize = 100;
const DB_FILE_NAME: &str = "anyrss.redb";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Config {
    pub db_path: PathBuf,
    pub listen_addr: String,
    /// How many items the list and RSS views return when the client does
    /// not say.
    pub list_limit: usize,
}

impl Config {
    /// Flags win over the environment, the environment over defaults.
    pub fn resolve(db: Option<PathBuf>, addr: Option<String>) -> Self {
        Self::resolve_with(db, addr, |key| std::env::var(key).ok())
    }

    fn resolve_with(
        db: Option<PathBuf>,
        addr: Option<String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let db_path = db
            .or_else(|| env(DB_ENV).filter(|v| !v.is_empty()).map(PathBuf::from))
            .unwrap_or_else(default_db_path);
        let listen_addr = addr
            .or_else(|| env(ADDR_ENV).filter(|v| !v.is_empty()))
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        Self {
            db_path,
            listen_addr,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("anyrss").join(DB_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(format!(".{DB_FILE_NAME}")))
}
