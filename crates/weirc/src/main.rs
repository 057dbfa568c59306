use anyhow::{bail, Context, Result};
use clap::Parser;
use config::WeircConfig;
use serde::de::DeserializeOwned;
use std::{
	io::Write,
	path::{Path, PathBuf},
};
use tracing::{debug, info};
use weir_compiler::{
	compile_with_report,
	decl::{DeploymentMap, PipelineDecl},
	CompilerOptions,
};
use weir_util::load_env;

mod config;

/// Compile a pipeline declaration into IR
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
	/// The pipeline declaration (`.json` or `.toml`)
	declaration: PathBuf,

	/// Deployment descriptors, keyed by node id (`.json` or `.toml`)
	#[arg(long, short)]
	deployment: Option<PathBuf>,

	/// Write IR here instead of stdout
	#[arg(long, short)]
	output: Option<PathBuf>,

	/// Compile, but do not write IR
	#[arg(long)]
	check: bool,
}

/// The file formats we can read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputFormat {
	Json,
	Toml,
}

impl InputFormat {
	fn from_path(path: &Path) -> Result<Self> {
		match path.extension().and_then(|x| x.to_str()) {
			Some("json") => Ok(Self::Json),
			Some("toml") => Ok(Self::Toml),
			_ => bail!(
				"cannot tell the format of `{}`, expected a `.json` or `.toml` file",
				path.display()
			),
		}
	}

	fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T> {
		return Ok(match self {
			Self::Json => serde_json::from_str(text)?,
			Self::Toml => toml::from_str(text)?,
		});
	}
}

fn read_input<T: DeserializeOwned>(path: &Path) -> Result<T> {
	let format = InputFormat::from_path(path)?;
	let text = std::fs::read_to_string(path)
		.with_context(|| format!("could not read `{}`", path.display()))?;
	return format
		.decode(&text)
		.with_context(|| format!("could not decode `{}`", path.display()));
}

fn main() -> Result<()> {
	let args = Args::parse();

	let config_res = match load_env::<WeircConfig>() {
		Ok(x) => x,

		#[expect(clippy::print_stderr)]
		Err(err) => {
			eprintln!("Error while loading .env: {err}");
			std::process::exit(1);
		}
	};

	let config = config_res.get_config().clone();

	// stdout carries IR, so logs go to stderr
	tracing_subscriber::fmt()
		.with_env_filter(config.weirc_loglevel.get_config())
		.without_time()
		.with_writer(std::io::stderr)
		.init();

	// Do this now, logging wasn't available earlier
	match config_res.get_path() {
		Some(path) => {
			debug!(message = "Loaded config from .env", ?path, ?config);
		}
		None => {
			debug!(
				message = "No `.env` found, loaded config from environment",
				?config
			);
		}
	};

	let decl: PipelineDecl = read_input(&args.declaration)?;
	let deployment: DeploymentMap = match &args.deployment {
		Some(path) => read_input(path)?,
		None => DeploymentMap::new(),
	};

	let report = compile_with_report(&decl, &deployment, &CompilerOptions::default())
		.with_context(|| format!("could not compile `{}`", args.declaration.display()))?;

	for (i, layer) in report.layers.iter().enumerate() {
		debug!(message = "Layer", layer = i, nodes = layer.len());
	}

	if config.weirc_fingerprint {
		let fingerprint = report.document.fingerprint()?;
		info!(
			message = "Compiled pipeline",
			pipeline_id = %report.document.pipeline_info.id,
			fingerprint = %fingerprint
		);
	}

	if args.check {
		info!(message = "Declaration is valid, not writing IR");
		return Ok(());
	}

	let json = if config.weirc_pretty {
		report.document.to_pretty_json()?
	} else {
		report.document.to_canonical_json()?
	};

	match &args.output {
		Some(path) => {
			std::fs::write(path, format!("{json}\n"))
				.with_context(|| format!("could not write `{}`", path.display()))?;
			info!(message = "Wrote IR", path = %path.display());
		}

		None => {
			let mut stdout = std::io::stdout().lock();
			stdout.write_all(json.as_bytes())?;
			stdout.write_all(b"\n")?;
		}
	}

	return Ok(());
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::CommandFactory;

	#[test]
	fn args_are_consistent() {
		Args::command().debug_assert();
	}

	#[test]
	fn args_parse() {
		let args = Args::parse_from(["weirc", "p.toml", "-d", "deploy.json", "--check"]);
		assert_eq!(args.declaration, PathBuf::from("p.toml"));
		assert_eq!(args.deployment, Some(PathBuf::from("deploy.json")));
		assert_eq!(args.output, None);
		assert!(args.check);
	}

	#[test]
	fn formats_from_extension() {
		assert_eq!(
			InputFormat::from_path(Path::new("a/b.json")).unwrap(),
			InputFormat::Json
		);
		assert_eq!(
			InputFormat::from_path(Path::new("b.toml")).unwrap(),
			InputFormat::Toml
		);
		assert!(InputFormat::from_path(Path::new("b.yaml")).is_err());
		assert!(InputFormat::from_path(Path::new("noext")).is_err());
	}

	#[test]
	fn toml_declarations_compile() {
		let decl: PipelineDecl = InputFormat::Toml
			.decode(
				r#"
				pipeline_id = "toml_pipeline"

				[[nodes]]
				id = "Gen"
				node_type = { name = "x.Gen", base_type = "INGEST" }
				outputs.examples = { name = "Examples", base_type = "DATASET" }

				[[nodes]]
				id = "Stats"
				node_type = { name = "x.Stats" }
				parameters = { threshold = 0.5, enabled = true }

				[nodes.inputs.examples]
				channels = [{ producer = "Gen", output = "examples" }]
				resolver = [{ op = "skip_if_empty", config = "{}" }]
				"#,
			)
			.unwrap();

		let deployment: DeploymentMap = InputFormat::Toml
			.decode(
				r#"
				[Gen.executor]
				kind = "native"
				implementation = "x.GenExecutor"

				[Stats.executor]
				kind = "batch"
				implementation = "x.StatsExecutor"
				pipeline_args = ["--direct_num_workers=4"]
				"#,
			)
			.unwrap();

		let report =
			compile_with_report(&decl, &deployment, &CompilerOptions::default()).unwrap();
		assert_eq!(report.counts.nodes, 2);
		assert_eq!(report.counts.channels, 1);
		assert_eq!(report.counts.resolver_steps, 1);
		assert_eq!(report.counts.deployment_entries, 2);
	}
}
