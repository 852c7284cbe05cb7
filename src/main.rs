//! Main entry point for the delivery batcher
//!
//! Thin wrapper that delegates to the interfaces layer; the application
//! logic lives in `interfaces::cli`.

// 全局内存分配器：使用 jemalloc
#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use delivery_batcher::interfaces::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        tracing::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
