//! cubesim シミュレータの設定
//!
//! 設定は以下の3層で解決される (後のものが優先):
//!
//! 1. 組み込みのデフォルト値
//! 2. YAML 設定ファイル (任意、[`find_config_file`] を参照)
//! 3. 環境変数 (`FAST_SIMULATE`, `CUBE_SERVER_DEBUG`,
//!    `CUBE_SERVER_SIM_PERSIST`, `CUBE_SERVER_SIM_SEED`)

pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "CUBESIM_CONFIG_PATH";
pub const FAST_SIMULATE_ENV: &str = "FAST_SIMULATE";
pub const DEBUG_ENV: &str = "CUBE_SERVER_DEBUG";
pub const PERSIST_PATH_ENV: &str = "CUBE_SERVER_SIM_PERSIST";
pub const SEED_ENV: &str = "CUBE_SERVER_SIM_SEED";

pub const DEFAULT_PERSIST_PATH: &str = "testdata/cube_server_sim_buckets.json";
const LOCAL_CONFIG_FILE: &str = "cubesim.yaml";

/// 解決済みのシミュレータ設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// 擬似レイテンシを完全にスキップする
    pub fast_simulate: bool,

    /// ディスパッチの詳細ログを出力する
    pub debug: bool,

    /// バケットストアの保存先ファイル
    pub persist_path: PathBuf,

    /// 乱数の固定シード (未指定ならエントロピーから生成)
    pub seed: Option<u64>,

    /// 擬似レイテンシの下限
    pub latency_min_ms: u64,

    /// `latency_min_ms` に加算されるランダム幅 (上限は含まない)
    pub latency_jitter_ms: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fast_simulate: false,
            debug: false,
            persist_path: PathBuf::from(DEFAULT_PERSIST_PATH),
            seed: None,
            latency_min_ms: 500,
            latency_jitter_ms: 3000,
        }
    }
}

impl SimConfig {
    /// テスト向けの設定: レイテンシなし、シード固定
    pub fn fast(persist_path: impl AsRef<Path>) -> Self {
        Self {
            fast_simulate: true,
            persist_path: persist_path.as_ref().to_path_buf(),
            seed: Some(42),
            ..Self::default()
        }
    }

    /// デフォルト値、設定ファイル、環境変数の順に解決する
    pub fn load() -> Result<Self> {
        let base = match find_config_file() {
            Some(path) => {
                tracing::debug!("設定ファイルを読み込み: {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        base.apply_env()
    }

    /// YAML 設定ファイルを読み込む (未指定のキーはデフォルト値のまま)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    /// 環境変数で `self` を上書きする
    pub fn apply_env(mut self) -> Result<Self> {
        if let Some(flag) = env_flag(FAST_SIMULATE_ENV) {
            self.fast_simulate = flag;
        }
        if let Some(flag) = env_flag(DEBUG_ENV) {
            self.debug = flag;
        }
        if let Ok(path) = std::env::var(PERSIST_PATH_ENV) {
            if !path.is_empty() {
                self.persist_path = PathBuf::from(path);
            }
        }
        if let Ok(raw) = std::env::var(SEED_ENV) {
            let seed = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: SEED_ENV.to_string(),
                value: raw.clone(),
            })?;
            self.seed = Some(seed);
        }
        Ok(self)
    }
}

fn env_flag(key: &str) -> Option<bool> {
    let value = std::env::var(key).ok()?;
    Some(matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    ))
}

/// グローバル設定ディレクトリを取得 (Linux では `~/.config/cubesim`)
pub fn get_config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("cubesim");
    Ok(dir)
}

/// シミュレータの設定ファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 CUBESIM_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: cubesim.yaml
/// 3. ~/.config/cubesim/config.yaml (グローバル設定)
pub fn find_config_file() -> Option<PathBuf> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Some(path);
        }
        tracing::warn!(
            "{} で指定されたファイルが存在しません: {}",
            CONFIG_PATH_ENV,
            path.display()
        );
    }

    // 2. カレントディレクトリで検索
    if let Ok(current_dir) = std::env::current_dir() {
        let path = current_dir.join(LOCAL_CONFIG_FILE);
        if path.exists() {
            return Some(path);
        }
    }

    // 3. グローバル設定ファイル
    let global = get_config_dir().ok()?.join("config.yaml");
    global.exists().then_some(global)
}
