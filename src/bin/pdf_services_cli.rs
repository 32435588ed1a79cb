//! PDF Services CLI: 上传输入文件、提交作业、等待结果并下载输出
//!
//! Usage:
//!   pdf-services-cli run <operation> <input> <output> [--params <json>] [--region us|eu] [--config <file>]
//!   pdf-services-cli operations                    List operation names
//!   pdf-services-cli version                       Show version information

use anyhow::{anyhow, bail, Context};
use pdf_services_rust::asset::MediaType;
use pdf_services_rust::auth::ServicePrincipalCredentials;
use pdf_services_rust::job::{JobRequest, OperationKind};
use pdf_services_rust::{ClientConfigBuilder, PdfServices, Region};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let outcome = match args[1].as_str() {
        "run" => cmd_run(&args[2..]).await,
        "operations" | "list" => {
            cmd_operations();
            Ok(())
        }
        "version" | "--version" | "-V" => {
            cmd_version();
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"pdf-services-cli: PDF Services 命令行工具

USAGE:
    pdf-services-cli <COMMAND> [OPTIONS]

COMMANDS:
    run <operation> <input> <output>   Upload input, run the operation, save the result
        --params <json>                Extra operation parameters (JSON object)
        --region <us|eu>               Service region (default us)
        --config <file>                JSON or YAML client configuration
    operations                         List operation names
    version                            Show version information
    help                               Show this help message

ENVIRONMENT:
    PDF_SERVICES_CLIENT_ID             OAuth client id (required for run)
    PDF_SERVICES_CLIENT_SECRET         OAuth client secret (required for run)
    PDF_SERVICES_REGION                Region override
    PDF_SERVICES_URI                   Base URI override
    RUST_LOG                           Log filter (default info)"#
    );
}

fn cmd_version() {
    println!("pdf-services-cli {}", env!("CARGO_PKG_VERSION"));
}

fn cmd_operations() {
    println!("{:<24} {:<22} {}", "NAME", "ENDPOINT", "RESULT");
    for kind in OperationKind::all() {
        println!(
            "{:<24} {:<22} {:?}",
            kind.name(),
            kind.endpoint(),
            kind.result_shape()
        );
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn positional(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut skip = false;
    for arg in args {
        if skip {
            skip = false;
            continue;
        }
        if arg.starts_with("--") {
            skip = true;
            continue;
        }
        out.push(arg.as_str());
    }
    out
}

async fn cmd_run(args: &[String]) -> anyhow::Result<()> {
    let positional = positional(args);
    let [operation, input, output] = positional.as_slice() else {
        bail!("run expects <operation> <input> <output>");
    };
    let kind: OperationKind = operation.parse()?;
    let input = Path::new(*input);
    let output = PathBuf::from(*output);

    let mut config = ClientConfigBuilder::new();
    if let Some(path) = flag_value(args, "--config") {
        config = config.load_file(path)?;
    }
    config = config.load_env()?;
    if let Some(region) = flag_value(args, "--region") {
        config = config.region(region.parse::<Region>()?);
    }

    let mut params = match flag_value(args, "--params") {
        Some(raw) => match serde_json::from_str::<Value>(raw).context("--params is not valid JSON")? {
            Value::Object(map) => map,
            _ => bail!("--params must be a JSON object"),
        },
        None => Map::new(),
    };

    let media_type = MediaType::from_path(input)
        .ok_or_else(|| anyhow!("cannot infer media type of {}", input.display()))?;
    let bytes = tokio::fs::read(input)
        .await
        .with_context(|| format!("reading {}", input.display()))?;

    let services = PdfServices::builder()
        .credentials(ServicePrincipalCredentials::from_env()?)
        .config(config.build()?)
        .build()?;

    let asset = services.upload(bytes, media_type.mime_type()).await?;
    params.insert("assetID".to_string(), Value::String(asset.asset_id().to_string()));

    let request = JobRequest::new(kind, &Value::Object(params))?;
    let handle = services.submit(&request).await?;
    let outcome = services.get_job_result(&handle).await?;
    let result = outcome
        .into_result()
        .ok_or_else(|| anyhow!("job finished without a result"))?;

    let assets = result.assets();
    match assets.as_slice() {
        [] => {
            println!("{}", serde_json::to_string_pretty(&result_json(&result))?);
        }
        [single] => {
            services.save_content(single, &output).await?;
            println!("Saved {}", output.display());
        }
        many => {
            tokio::fs::create_dir_all(&output).await?;
            for (i, asset) in many.iter().enumerate() {
                let content = services.get_content(asset).await?;
                let ext = MediaType::extension_for_mime(content.media_type()).unwrap_or("bin");
                let path = output.join(format!("{}-{}.{}", kind.name(), i, ext));
                tokio::fs::write(&path, content.bytes()).await?;
                println!("Saved {}", path.display());
            }
        }
    }
    Ok(())
}

fn result_json(result: &pdf_services_rust::job::JobResult) -> Value {
    match result {
        pdf_services_rust::job::JobResult::Properties { metadata } => metadata.clone(),
        other => Value::String(format!("{:?}", other)),
    }
}
