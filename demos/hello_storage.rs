use std::sync::Arc;

use gosub_storage::cookies::{CookieJarHandle, CookieOptions, PersistentCookieJar};
use gosub_storage::storage::{JsonAttributeStore, SqliteLocalArea};
use gosub_storage::{Environment, StorageConfig, StorageFacade};
use parking_lot::RwLock;
use serde_json::json;
use url::Url;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Everything this example writes ends up in one directory, so a second run
    // picks up where the first one stopped.
    let data_dir = std::env::temp_dir().join("gosub-storage-demo");
    std::fs::create_dir_all(&data_dir)?;

    let document = Url::parse("https://example.com/app/index.html")?;

    // The key/value store is scoped to the document's origin. The legacy store is
    // only used when the key/value store fails its probe.
    let db_path = data_dir.join("local_storage.db");
    let local = SqliteLocalArea::open(&db_path.to_string_lossy(), &document.origin())?;
    let user_data = JsonAttributeStore::new(data_dir.join("user_data"))?;

    let jar: CookieJarHandle = Arc::new(RwLock::new(PersistentCookieJar::open(
        data_dir.join("cookies.json"),
        Some(document),
    )?));

    let env = Environment::builder()
        .local_storage(Arc::new(local))
        .user_data(Arc::new(user_data))
        .cookie_jar(jar)
        .build();

    let config = StorageConfig::builder().expires_prefix("_t_").build()?;
    let storage = StorageFacade::new(env, config);

    println!("support: {:?}", storage.support());
    println!("active backend: {:?}", storage.active_backend());

    match storage.get_item("visits").as_str().and_then(|v| v.parse::<u64>().ok()) {
        Some(visits) => {
            println!("welcome back, visit #{}", visits + 1);
            storage.set_item("visits", Some(&json!(visits + 1)), None);
        }
        None => {
            println!("first visit");
            storage.set_item("visits", Some(&json!(1)), None);
        }
    }

    // A structured value that is gone again in ten seconds.
    storage.set_item("session", Some(&json!({"user": "guest", "theme": "dark"})), Some(10_000));
    println!("session: {:?}", storage.get_item("session").into_value());

    let options = CookieOptions::default().expires(24 * 60 * 60 * 1000);
    storage.set_cookie("last seen", Some("today; probably"), Some(&options));
    println!("cookie: {:?}", storage.get_cookie("last seen"));

    storage.remove_cookie("unused");
    storage.remove_item("unused");

    Ok(())
}
