use env_logger::{Builder, Target};
use log::LevelFilter;
use std::io::Write;

pub fn init() {
    let mut builder = Builder::new();

    builder
        .target(Target::Stderr)
        .filter_level(if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        // RUST_LOG wins over the build default
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        });

    if let Err(e) = builder.try_init() {
        eprintln!("Logger already initialized: {}", e);
    }
}
