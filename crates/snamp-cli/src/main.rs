use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::time::{Duration, sleep};
use tracing::info;
use tracing_subscriber::EnvFilter;

use snamp_core::impls::TokioExecutor;
use snamp_core::{Listener, ListenerListBuilder, ListenerListConfig, WeakListenerList};

/// 管理対象リソースの属性変更イベント
#[derive(Debug, Clone)]
struct AttributeChanged {
    resource: String,
    attribute: String,
    value: i64,
}

struct ConsoleListener {
    name: &'static str,
}

impl Listener<AttributeChanged> for ConsoleListener {
    fn on_event(&self, event: &AttributeChanged) {
        println!(
            "[{}] {}.{} = {}",
            self.name, event.resource, event.attribute, event.value
        );
    }
}

#[derive(Default)]
struct CountingListener {
    seen: AtomicUsize,
}

impl Listener<AttributeChanged> for CountingListener {
    fn on_event(&self, _event: &AttributeChanged) {
        self.seen.fetch_add(1, Ordering::Relaxed);
    }
}

type Listeners = WeakListenerList<dyn Listener<AttributeChanged>, AttributeChanged>;

/// 第 1 引数に JSON 設定ファイルのパスがあれば読む
fn load_config() -> Result<ListenerListConfig, Box<dyn Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)?;
            let config = ListenerListConfig::from_json(&json)?;
            info!(%path, ?config, "loaded listener list config");
            Ok(config)
        }
        None => Ok(ListenerListConfig::default()),
    }
}

fn event(value: i64) -> AttributeChanged {
    AttributeChanged {
        resource: "jmx-connector".to_string(),
        attribute: "heapUsed".to_string(),
        value,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // (A) リストと listener を用意（リストは listener を弱参照でしか持たない）
    let listeners: Listeners = ListenerListBuilder::new().config(load_config()?).build()?;

    let console: Arc<dyn Listener<AttributeChanged>> =
        Arc::new(ConsoleListener { name: "console" });
    let audit: Arc<dyn Listener<AttributeChanged>> = Arc::new(ConsoleListener { name: "audit" });
    let counter = Arc::new(CountingListener::default());
    let counter_dyn: Arc<dyn Listener<AttributeChanged>> = counter.clone();

    listeners.add(&console);
    listeners.add(&audit);
    listeners.add(&counter_dyn);

    // (B) 同期発火：登録順に届く
    listeners.fire(&event(128));

    // (C) audit を手放すと、次の変更操作か sanitize で消える
    drop(audit);
    println!("counts before sanitize: {}", serde_json::to_string(&listeners.counts())?);
    let survivors = listeners.sanitize();
    println!("survivors after sanitize: {survivors}");

    // (D) 非同期発火：tokio の blocking pool で配送
    let executor = TokioExecutor::current()?;
    for value in [256, 512] {
        listeners.fire_async(event(value), &executor)?;
    }

    // 完了通知はないので、サンプルとして少し待つ
    sleep(Duration::from_millis(100)).await;
    println!("counter saw {} events", counter.seen.load(Ordering::Relaxed));

    listeners.remove_same(&console);
    println!("final counts: {}", serde_json::to_string(&listeners.counts())?);
    Ok(())
}
