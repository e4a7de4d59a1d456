//! Evaluation pipeline: wire config, loggers, vocabularies, cache, and
//! the predictor together and walk a dataset partition.

use std::collections::HashSet;
use std::path::PathBuf;

use burn::backend::ndarray::NdArray;
use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use rand::seq::SliceRandom;

use gast::{LcPredictor, LcSample};
use proofstate::process::SESSION_PREFIX;
use proofstate::{files_on_split, load_sample, process_global_context, process_local_env,
    state_id, SexpCache, TermParser};

use crate::config::{load_config, EvalConfig};
use crate::logging::setup_loggers;
use crate::results::EvalSummary;

/// Backend the evaluation pipeline runs on.
pub type EvalBackend = NdArray<f32>;

/// Dataset partition to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Partition {
    Train,
    Valid,
    Test,
}

impl Partition {
    fn name(&self) -> &'static str {
        match self {
            Partition::Train => "train",
            Partition::Valid => "valid",
            Partition::Test => "test",
        }
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Arguments for `gastnet eval`.
pub struct EvalArgs {
    /// Path to the TOML config file.
    pub config: PathBuf,
    /// Partition to evaluate.
    pub partition: Partition,
    /// Random sub-sample size; evaluates everything when absent.
    pub max_states: Option<usize>,
    /// Optional path for the JSON summary.
    pub output: Option<PathBuf>,
}

/// Arguments for `gastnet splits`.
pub struct SplitsArgs {
    /// Path to the TOML config file.
    pub config: PathBuf,
}

/// Evaluate the local-context model over one dataset partition.
pub fn run_eval(args: EvalArgs) -> anyhow::Result<()> {
    let config = load_config(&args.config)?;
    let (mut run_log, mut res_log) = setup_loggers(&config.log_dir, &config.model)?;

    let predictor = build_predictor(&config)?;
    let cache = SexpCache::load(&config.sexp_cache)?;

    let splits = files_on_split(&config.data, &config.split)?;
    let mut files = match args.partition {
        Partition::Train => splits.train,
        Partition::Valid => splits.valid,
        Partition::Test => splits.test,
    };
    let total_files = files.len();

    if let Some(max) = args.max_states {
        if max < files.len() {
            files.shuffle(&mut rand::thread_rng());
            files.truncate(max);
        }
    }

    run_log.log(&format!(
        "evaluating {} of {total_files} files from the {} partition",
        files.len(),
        args.partition.name()
    ))?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) Scoring states")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let mut parser = TermParser::new();
    let mut seen = HashSet::new();
    let mut summary = EvalSummary {
        partition: args.partition.name().to_string(),
        core: config.model.core_path().to_string(),
        total_files,
        states_evaluated: 0,
        duplicates_skipped: 0,
        no_argument_skipped: 0,
        target_missing_skipped: 0,
        correct: 0,
        mean_loss: 0.0,
        known_tactics: 0,
        global_constants_seen: 0,
    };
    let mut loss_sum = 0.0;

    for file in &files {
        let sample = load_sample(file)?;
        let (goals, contexts) = process_local_env(&mut parser, &sample.state)?;
        let global_context =
            process_global_context(&mut parser, &cache, &sample.state, SESSION_PREFIX)?;
        summary.global_constants_seen += global_context
            .iter()
            .filter(|e| !e.is_placeholder())
            .count();

        if predictor.tactics().index_of_head(&sample.tactic).is_some() {
            summary.known_tactics += 1;
        }

        for (goal, local_context) in goals.into_iter().zip(contexts) {
            let id = state_id(&goal, &local_context);
            if !seen.insert(id.clone()) {
                summary.duplicates_skipped += 1;
                continue;
            }

            let Some(target) = proofstate::tactic::argument(&sample.tactic) else {
                summary.no_argument_skipped += 1;
                continue;
            };
            let target_in_slots = local_context
                .iter()
                .take(gast::CONTEXT_SLOTS)
                .any(|e| e.ident == target);
            if !target_in_slots {
                summary.target_missing_skipped += 1;
                run_log.log(&format!("{id}: target {target} outside scored context"))?;
                continue;
            }

            let lc_sample = LcSample {
                target_ident: target.to_string(),
                goal,
                local_context,
            };
            let output = predictor.predict(&lc_sample)?;

            summary.states_evaluated += 1;
            loss_sum += output.loss_value();
            let predicted = output
                .top_prediction()
                .map(|p| (p.ident.clone(), p.prob))
                .unwrap_or_default();
            if predicted.0 == target {
                summary.correct += 1;
            }

            run_log.log(&format!(
                "{id}: true {target} predicted {} p={:.4} loss={:.4}",
                predicted.0,
                predicted.1,
                output.loss_value()
            ))?;
        }

        pb.inc(1);
    }
    pb.finish_with_message("done");

    if summary.states_evaluated > 0 {
        summary.mean_loss = loss_sum / summary.states_evaluated as f64;
    }

    res_log.log(&format!(
        "partition={} files={} states={} correct={} accuracy={:.4} mean_loss={:.4} \
         duplicates={} no_argument={} target_missing={} known_tactics={} global_constants={}",
        summary.partition,
        summary.total_files,
        summary.states_evaluated,
        summary.correct,
        summary.accuracy(),
        summary.mean_loss,
        summary.duplicates_skipped,
        summary.no_argument_skipped,
        summary.target_missing_skipped,
        summary.known_tactics,
        summary.global_constants_seen,
    ))?;

    if let Some(output) = &args.output {
        std::fs::write(output, serde_json::to_string_pretty(&summary)?)?;
        tracing::info!(path = %output.display(), "Wrote evaluation summary");
    }

    tracing::info!(
        partition = summary.partition,
        states = summary.states_evaluated,
        accuracy = summary.accuracy(),
        mean_loss = summary.mean_loss,
        "Evaluation complete"
    );

    Ok(())
}

/// Print the number of data files in each split partition.
pub fn run_splits(args: SplitsArgs) -> anyhow::Result<()> {
    let config = load_config(&args.config)?;
    let splits = files_on_split(&config.data, &config.split)?;

    println!("split file: {}", config.split.display());
    println!("  train: {} files", splits.train.len());
    println!("  valid: {} files", splits.valid.len());
    println!("  test:  {} files", splits.test.len());
    Ok(())
}

fn build_predictor(config: &EvalConfig) -> anyhow::Result<LcPredictor<EvalBackend>> {
    LcPredictor::from_files(
        &config.nonterminals,
        &config.tactics,
        config.embedding_dim,
        config.sortk,
        config.dropout,
        Default::default(),
    )
}
