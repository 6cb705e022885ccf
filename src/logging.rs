//! Log backend setup: unified stderr format with millisecond timestamps.
//! Default level is `info`; `RUST_LOG` overrides per module.

use std::io::Write;

pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {:<15}: {:<7} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.target(),
                record.level(),
                record.args()
            )
        })
        .init();
}
