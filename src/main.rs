//! 命令行入口

use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use autotranslate::parsers::html::{html_to_dom, serialize_document};
use autotranslate::translation::{
    constants, AutoTranslator, ConfigManager, DomLocator, FileWatcher, KeywordClassifier,
    MutationDebouncer, TranslationResult, TranslatorConfig,
};

#[derive(Parser, Debug)]
#[command(name = "autotranslate", version, about = "自动翻译 HTML 文档中的英文文本")]
struct Cli {
    /// 输入 HTML 文件
    #[arg(required_unless_present_any = ["print_config", "clear_cache"])]
    input: Option<PathBuf>,

    /// 输出文件，缺省时写到标准输出
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 配置文件路径
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 翻译服务地址
    #[arg(long)]
    api_url: Option<String>,

    /// 每个请求最多包含的文本数
    #[arg(long)]
    batch_size: Option<usize>,

    /// 持久化缓存文件
    #[arg(long)]
    cache: Option<String>,

    /// 输入文档的字符编码
    #[arg(long, default_value = "utf-8")]
    encoding: String,

    /// 先清空持久化缓存
    #[arg(long)]
    clear_cache: bool,

    /// 持续监听输入文件，变化后重新翻译
    #[arg(short, long)]
    watch: bool,

    /// 打印示例配置后退出
    #[arg(long)]
    print_config: bool,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,
}

type HtmlTranslator = AutoTranslator<DomLocator<KeywordClassifier>>;

/// 一次“读取、翻译、写出”的任务
struct Job {
    input: PathBuf,
    output: Option<PathBuf>,
    encoding: String,
    translator: Rc<HtmlTranslator>,
}

impl Job {
    async fn run(&self) -> TranslationResult<()> {
        let data = std::fs::read(&self.input)?;
        let dom = html_to_dom(&data, &self.encoding)?;

        let report = self.translator.translate_tree(&dom.document).await;
        if report.text.is_busy() {
            // 正在进行的一轮会写出自己的结果
            tracing::debug!("上一轮翻译尚未结束，跳过本次输出");
            return Ok(());
        }

        let html = serialize_document(&dom.document)?;
        self.write_output(&html)
    }

    fn write_output(&self, html: &[u8]) -> TranslationResult<()> {
        match &self.output {
            Some(path) => {
                // 内容相同时不写，避免监听自身输出时反复触发
                if std::fs::read(path).is_ok_and(|existing| existing == html) {
                    tracing::debug!("输出未变化: {}", path.display());
                    return Ok(());
                }
                std::fs::write(path, html)?;
                tracing::info!("已写入 {}", path.display());
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(html)?;
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> TranslationResult<TranslatorConfig> {
    let mut config = ConfigManager::load(cli.config.as_deref())?.into_config();

    if let Some(api_url) = &cli.api_url {
        config.api_url = api_url.clone();
    }
    if let Some(batch_size) = cli.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(cache) = &cli.cache {
        config.cache_path = Some(cache.clone());
    }
    if config.cache_path.is_none() {
        config.cache_path = Some(constants::DEFAULT_CACHE_PATH.to_string());
    }

    config.validate()?;
    Ok(config)
}

async fn session(cli: Cli, config: TranslatorConfig) -> TranslationResult<()> {
    let translator = Rc::new(AutoTranslator::from_config(&config)?);
    let control = translator.control();

    if cli.clear_cache {
        control.clear_cache();
    }

    let Some(input) = cli.input else {
        return Ok(());
    };

    let job = Rc::new(Job {
        input,
        output: cli.output,
        encoding: cli.encoding,
        translator,
    });
    job.run().await?;

    if cli.watch {
        let watcher = FileWatcher::new(&job.input, config.watch_interval());
        let rescan_job = Rc::clone(&job);
        let debouncer = Rc::new(MutationDebouncer::new(config.debounce_delay(), move || {
            let job = Rc::clone(&rescan_job);
            async move {
                if let Err(e) = job.run().await {
                    tracing::warn!("重新翻译失败: {}", e);
                }
            }
        }));

        debouncer.attach(&watcher);
        watcher.start();
        tracing::info!("正在监听 {}，按 Ctrl+C 退出", job.input.display());

        tokio::signal::ctrl_c().await?;
        watcher.stop();
        debouncer.cancel();
    }

    let stats = control.stats();
    tracing::info!(
        "共完成 {} 轮翻译，发送 {} 个请求，其中 {} 个回退为原文；缓存 {} 条",
        stats.passes_completed,
        stats.translator.requests,
        stats.translator.fallbacks,
        control.cache_size()
    );

    Ok(())
}

fn run(cli: Cli) -> TranslationResult<()> {
    if cli.print_config {
        print!("{}", ConfigManager::example_config()?);
        return Ok(());
    }

    let config = build_config(&cli)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = tokio::task::LocalSet::new();
    local.block_on(&runtime, session(cli, config))
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("错误: {}", e);
        std::process::exit(1);
    }
}
