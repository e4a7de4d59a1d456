//! TOML config loading for the evaluation CLI.
//!
//! Deserializes the run configuration (vocabulary/data paths, model
//! hyperparameters, and the model-selection tag) and validates it.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Run configuration, loaded from a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct EvalConfig {
    /// Path to the nonterminal vocabulary JSON array.
    pub nonterminals: PathBuf,
    /// Path to the tactic vocabulary JSON array.
    pub tactics: PathBuf,
    /// Path to the symbolic-expression cache Parquet file.
    pub sexp_cache: PathBuf,
    /// Root directory of the per-project dataset.
    pub data: PathBuf,
    /// Path to the split-definition JSON file.
    pub split: PathBuf,
    /// Node embedding dimension.
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,
    /// Sort-pooling node count.
    #[serde(default = "default_sortk")]
    pub sortk: usize,
    /// Classifier dropout probability.
    #[serde(default = "default_dropout")]
    pub dropout: f64,
    /// Compute device. Only "cpu" is meaningful for the ndarray backend.
    #[serde(default = "default_device")]
    pub device: String,
    /// Directory the run/result logs are written under.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Which trained-model variant this run evaluates.
    #[serde(flatten)]
    pub model: ModelSelection,
}

fn default_embedding_dim() -> usize {
    16
}
fn default_sortk() -> usize {
    30
}
fn default_dropout() -> f64 {
    0.5
}
fn default_device() -> String {
    "cpu".to_string()
}
fn default_log_dir() -> PathBuf {
    PathBuf::from("./logs")
}

impl EvalConfig {
    /// Log a warning for settings the ndarray backend cannot honor.
    pub fn validate(&self) {
        if self.device != "cpu" {
            tracing::warn!(
                device = %self.device,
                "ndarray backend is CPU-only; falling back to cpu"
            );
        }
    }
}

/// Load and validate an [`EvalConfig`] from a TOML file.
pub fn load_config(path: &Path) -> anyhow::Result<EvalConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config {}: {e}", path.display()))?;
    let config: EvalConfig = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("failed to parse config {}: {e}", path.display()))?;
    config.validate();
    tracing::info!(path = %path.display(), core = config.model.core_path(), "Loaded eval config");
    Ok(config)
}

/// Reinforcement-learning model variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RlVariant {
    /// Trained by reinforcement learning alone.
    #[serde(rename = "rl")]
    Rl,
    /// Imitation-bootstrapped from all proofs.
    #[serde(rename = "im_a")]
    ImitationAll,
    /// Imitation-bootstrapped from human proofs.
    #[serde(rename = "im_h")]
    ImitationHuman,
    /// Imitation-bootstrapped from synthetic proofs.
    #[serde(rename = "im_s")]
    ImitationSynthetic,
}

/// Supervised-learning model variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlVariant {
    /// Graph-AST model trained on human proofs.
    GastHuman,
    /// Graph-AST model trained on all proofs.
    GastAll,
    /// Graph-AST model trained on synthetic proofs.
    GastSynthetic,
    /// Transformer model trained on human proofs.
    TransHuman,
    /// Transformer model trained on all proofs.
    TransAll,
    /// Transformer model trained on synthetic proofs.
    TransSynthetic,
    /// Oracle upper bound.
    Optimal,
}

/// Which trained model a run evaluates.
///
/// Deserialized from the flat `model_type` + `rl_type`/`sl_model` config
/// fields. Unrecognized combinations fail at load time, so every value
/// that exists has a log path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSelection {
    /// A reinforcement-learning variant (`model_type = "rl"`).
    Rl(RlVariant),
    /// A supervised-learning variant (`model_type = "sl"`).
    Sl(SlVariant),
}

impl ModelSelection {
    /// Filesystem tag identifying this selection's log paths.
    pub fn core_path(&self) -> &'static str {
        match self {
            ModelSelection::Rl(RlVariant::Rl) => "rl/rl",
            ModelSelection::Rl(RlVariant::ImitationAll) => "rl/im_a",
            ModelSelection::Rl(RlVariant::ImitationHuman) => "rl/im_h",
            ModelSelection::Rl(RlVariant::ImitationSynthetic) => "rl/im_s",
            ModelSelection::Sl(SlVariant::GastHuman) => "sl/gast_h",
            ModelSelection::Sl(SlVariant::GastAll) => "sl/gast_a",
            ModelSelection::Sl(SlVariant::GastSynthetic) => "sl/gast_s",
            ModelSelection::Sl(SlVariant::TransHuman) => "sl/trans_h",
            ModelSelection::Sl(SlVariant::TransAll) => "sl/trans_a",
            ModelSelection::Sl(SlVariant::TransSynthetic) => "sl/trans_s",
            ModelSelection::Sl(SlVariant::Optimal) => "sl/optimal",
        }
    }
}

impl<'de> Deserialize<'de> for ModelSelection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawSelection {
            model_type: String,
            #[serde(default)]
            rl_type: Option<RlVariant>,
            #[serde(default)]
            sl_model: Option<SlVariant>,
        }

        let raw = RawSelection::deserialize(deserializer)?;
        match raw.model_type.as_str() {
            "rl" => raw
                .rl_type
                .map(ModelSelection::Rl)
                .ok_or_else(|| serde::de::Error::custom("model_type \"rl\" requires rl_type")),
            "sl" => raw
                .sl_model
                .map(ModelSelection::Sl)
                .ok_or_else(|| serde::de::Error::custom("model_type \"sl\" requires sl_model")),
            other => Err(serde::de::Error::custom(format!(
                "unknown model_type \"{other}\" (expected \"rl\" or \"sl\")"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_selection(toml_str: &str) -> Result<ModelSelection, toml::de::Error> {
        toml::from_str(toml_str)
    }

    #[test]
    fn test_full_config() {
        let toml_str = r#"
            nonterminals = "vocab/nonterminals.json"
            tactics = "vocab/tactics.json"
            sexp_cache = "cache/sexp_cache.parquet"
            data = "data"
            split = "data/split.json"
            embedding_dim = 32
            sortk = 50
            dropout = 0.3
            device = "cpu"
            log_dir = "run_logs"
            model_type = "sl"
            sl_model = "gast_human"
        "#;
        let config: EvalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.embedding_dim, 32);
        assert_eq!(config.sortk, 50);
        assert!((config.dropout - 0.3).abs() < 1e-9);
        assert_eq!(config.log_dir, PathBuf::from("run_logs"));
        assert_eq!(config.model, ModelSelection::Sl(SlVariant::GastHuman));
        assert_eq!(config.model.core_path(), "sl/gast_h");
    }

    #[test]
    fn test_defaults() {
        let toml_str = r#"
            nonterminals = "n.json"
            tactics = "t.json"
            sexp_cache = "c.parquet"
            data = "data"
            split = "split.json"
            model_type = "rl"
            rl_type = "rl"
        "#;
        let config: EvalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.embedding_dim, 16);
        assert_eq!(config.sortk, 30);
        assert!((config.dropout - 0.5).abs() < 1e-9);
        assert_eq!(config.device, "cpu");
        assert_eq!(config.log_dir, PathBuf::from("./logs"));
    }

    #[test]
    fn test_core_path_covers_every_selection() {
        let cases = [
            ("rl", "rl", "rl/rl"),
            ("rl", "im_a", "rl/im_a"),
            ("rl", "im_h", "rl/im_h"),
            ("rl", "im_s", "rl/im_s"),
            ("sl", "gast_human", "sl/gast_h"),
            ("sl", "gast_all", "sl/gast_a"),
            ("sl", "gast_synthetic", "sl/gast_s"),
            ("sl", "trans_human", "sl/trans_h"),
            ("sl", "trans_all", "sl/trans_a"),
            ("sl", "trans_synthetic", "sl/trans_s"),
            ("sl", "optimal", "sl/optimal"),
        ];
        for (model_type, variant, expected) in cases {
            let field = if model_type == "rl" { "rl_type" } else { "sl_model" };
            let selection = parse_selection(&format!(
                "model_type = \"{model_type}\"\n{field} = \"{variant}\"\n"
            ))
            .unwrap();
            assert_eq!(selection.core_path(), expected);
        }
    }

    #[test]
    fn test_invalid_selection_rejected() {
        // Missing sub-variant.
        assert!(parse_selection("model_type = \"rl\"\n").is_err());
        assert!(parse_selection("model_type = \"sl\"\n").is_err());
        // Wrong sub-variant field for the model type.
        assert!(parse_selection("model_type = \"rl\"\nsl_model = \"optimal\"\n").is_err());
        // Unknown model type and unknown variants.
        assert!(parse_selection("model_type = \"qlearning\"\nrl_type = \"rl\"\n").is_err());
        assert!(parse_selection("model_type = \"rl\"\nrl_type = \"im_x\"\n").is_err());
        assert!(parse_selection("model_type = \"sl\"\nsl_model = \"gast\"\n").is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(load_config(&tmp.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_load_config_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("eval.toml");
        std::fs::write(
            &path,
            r#"
                nonterminals = "n.json"
                tactics = "t.json"
                sexp_cache = "c.parquet"
                data = "data"
                split = "split.json"
                model_type = "sl"
                sl_model = "optimal"
            "#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.model.core_path(), "sl/optimal");
    }
}
