use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use tracing::info;

use scheduler_core::{
    logging::{init_logging, LogFormat, LogLevel},
    BehaviorConfig, SelectorConfig, WorkerSelectStrategy,
};
use scheduler_dispatcher::SelectStrategy;
use worker_select::app::{load_tasks, load_workers, PlacementPass};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let matches = Command::new("worker-select")
        .version("1.0.0")
        .about("分布式任务调度系统 Worker 选择工具")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("选择器配置文件路径(TOML)")
                .global(true),
        )
        .arg(
            Arg::new("behavior")
                .short('b')
                .long("behavior")
                .value_name("FILE")
                .help("Worker行为配置(JSON)，覆盖配置文件中的behavior_file")
                .global(true),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别")
                .value_parser(["trace", "debug", "info", "warn", "error"])
                .global(true),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式")
                .value_parser(["json", "pretty", "text"])
                .global(true),
        )
        .subcommand(
            Command::new("select")
                .about("对一批任务执行Worker选择并输出分配结果(JSON)")
                .arg(
                    Arg::new("workers")
                        .short('w')
                        .long("workers")
                        .value_name("FILE")
                        .help("Worker快照文件(JSON数组)")
                        .required(true),
                )
                .arg(
                    Arg::new("tasks")
                        .short('t')
                        .long("tasks")
                        .value_name("FILE")
                        .help("待分配任务文件(JSON数组)")
                        .required(true),
                ),
        )
        .subcommand(Command::new("validate").about("校验选择器配置与Worker行为配置"))
        .get_matches();

    let config = load_config(&matches)?;

    // 初始化日志系统
    init_logging(&config.logging)?;

    let behavior = config.load_behavior()?;
    let strategy = SelectStrategy::from_behavior(&behavior);
    info!("使用选择策略: {}", strategy.name());

    match matches.subcommand() {
        Some(("select", sub)) => run_select(sub, &config, &strategy).await,
        Some(("validate", _)) => run_validate(&config, &behavior),
        Some((other, _)) => Err(anyhow::anyhow!("不支持的子命令: {other}")),
        None => Err(anyhow::anyhow!("缺少子命令")),
    }
}

/// 加载配置，命令行参数优先于配置文件与环境变量
fn load_config(matches: &ArgMatches) -> Result<SelectorConfig> {
    let config_path = matches.get_one::<String>("config").map(String::as_str);
    let mut config = SelectorConfig::load(config_path).with_context(|| {
        format!("加载配置文件失败: {}", config_path.unwrap_or("<default>"))
    })?;

    if let Some(level) = matches.get_one::<String>("log-level") {
        config.logging.level = level.parse::<LogLevel>()?;
    }
    if let Some(format) = matches.get_one::<String>("log-format") {
        config.logging.format = format.parse::<LogFormat>()?;
    }
    if let Some(path) = matches.get_one::<String>("behavior") {
        config.behavior_file = Some(PathBuf::from(path));
    }

    Ok(config)
}

async fn run_select(
    matches: &ArgMatches,
    config: &SelectorConfig,
    strategy: &SelectStrategy,
) -> Result<()> {
    let workers_path = required_path(matches, "workers")?;
    let tasks_path = required_path(matches, "tasks")?;

    let workers = load_workers(workers_path).await?;
    let tasks = load_tasks(tasks_path).await?;
    info!("加载了 {} 个Worker, {} 个任务", workers.len(), tasks.len());

    let report = PlacementPass::new(strategy, config.runner.clone(), workers).run(&tasks);

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("序列化分配结果失败")?
    );
    Ok(())
}

fn run_validate(config: &SelectorConfig, behavior: &BehaviorConfig) -> Result<()> {
    behavior.validate().context("Worker行为配置验证失败")?;
    info!(
        "配置有效: 策略 {}, 版本规则 {:?}, 允许可用组拥挤: {}",
        behavior.select_strategy.type_name(),
        config.runner.version_ordering,
        config.runner.allow_availability_group_crowding
    );
    println!("{}", behavior.to_json_pretty()?);
    Ok(())
}

fn required_path<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a Path> {
    matches
        .get_one::<String>(name)
        .map(Path::new)
        .ok_or_else(|| anyhow::anyhow!("缺少参数: --{name}"))
}
