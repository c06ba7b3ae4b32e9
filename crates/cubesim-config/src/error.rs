use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ディレクトリが見つかりません")]
    ConfigDirNotFound,

    #[error("{key} の値が不正です: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML エラー: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
