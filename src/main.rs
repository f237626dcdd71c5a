use anyhow::{anyhow, Context, Result};
use clap::Parser;
use result_filter::{entities, has_project_scope, FilterCompiler, FilterConfig, MappedEntity};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use sea_query::{ConditionalStatement, PostgresQueryBuilder};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 过滤表达式到 SQL 的编译工具
#[derive(Debug, Parser)]
#[command(name = "result-filter", version, about)]
struct Cli {
    /// 目标实体 (results, runs, projects, artifacts, widget_configs)
    #[arg(short, long, default_value = "results", env = "RESULT_FILTER_ENTITY")]
    entity: String,

    /// JSON 配置文件 (数组字段登记)
    #[arg(short, long, env = "RESULT_FILTER_CONFIG")]
    config: Option<PathBuf>,

    /// 过滤表达式, 例如 `result=failed` `metadata.tags*smoke;nightly`；为空时进入交互模式
    expressions: Vec<String>,
}

/// 创建编译器实例，指定了配置文件时从文件加载，否则使用默认配置
fn create_compiler(config: Option<&PathBuf>) -> Result<FilterCompiler> {
    let config = match config {
        Some(path) => {
            let config = FilterConfig::from_json_file(path)?;
            info!(path = %path.display(), array_fields = config.array_fields.len(), "loaded filter config");
            config
        }
        None => FilterConfig::default(),
    };
    Ok(FilterCompiler::from_config(config))
}

/// 编译整组表达式并打印最终的 SQL
fn run_batch(compiler: &FilterCompiler, entity: &MappedEntity, expressions: &[String]) {
    let (query, skipped) = compiler.apply_with_report(entity.select_all(), expressions, entity);

    println!("{}", query.to_string(PostgresQueryBuilder));
    for skip in &skipped {
        println!("-- skipped `{}`: {}", skip.expression, skip.error);
    }
    if !has_project_scope(expressions) {
        println!("-- warning: no project-scoping filter");
    }
}

/// 交互模式：每行一条表达式
fn run_repl(compiler: &FilterCompiler, entity: &MappedEntity) -> Result<()> {
    println!("--- result-filter: {} ---", entity.table());
    println!("每行输入一条过滤表达式, Ctrl-D 退出");

    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline(">> ") {
            Ok(line) => {
                let line = line.trim_end();
                if line.is_empty() {
                    continue;
                }
                editor.add_history_entry(line)?;

                match compiler.try_compile(line, entity) {
                    Ok(predicate) => {
                        let query = entity.select_all().and_where(predicate).to_owned();
                        println!("{}", query.to_string(PostgresQueryBuilder));
                    }
                    Err(error) => println!("✗ {}", error),
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(error) => return Err(error.into()),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let entity = entities::by_name(&cli.entity)
        .ok_or_else(|| anyhow!("unknown entity '{}'", cli.entity))?;
    let compiler = create_compiler(cli.config.as_ref()).context("failed to load filter config")?;

    if cli.expressions.is_empty() {
        run_repl(&compiler, &entity)
    } else {
        run_batch(&compiler, &entity, &cli.expressions);
        Ok(())
    }
}
