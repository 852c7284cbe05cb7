//! 订单生成器
//!
//! Emits random orders as JSON lines, ready to be piped into
//! `delivery-batcher --orders -`. Kitchens get fixed random positions so
//! orders from the same kitchen share a location.

use clap::Parser;
use delivery_batcher::shared::geometry::Location;
use delivery_batcher::shared::protocol::{
    AdvanceOrderRequest, NewOrderRequest, OrderStatus, ReadyTime,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{self, BufWriter, Write};

#[derive(Parser, Debug)]
#[command(name = "order-generator")]
#[command(about = "Generates random delivery orders as JSON lines", long_about = None)]
struct Args {
    /// 订单数量
    #[arg(short = 'n', long, default_value_t = 1000)]
    count: u64,

    /// 厨房数量
    #[arg(short, long, default_value_t = 20)]
    kitchens: u64,

    /// 顾客数量
    #[arg(short, long, default_value_t = 200)]
    customers: u64,

    /// 出餐时间范围 [0, max_ready_time]
    #[arg(long, default_value_t = 120)]
    max_ready_time: ReadyTime,

    /// 地图边长，厨房坐标落在 [0, grid) 内
    #[arg(short, long, default_value_t = 50.0)]
    grid: f64,

    /// 每笔订单之后随机插入送达事件的概率
    #[arg(long, default_value_t = 0.0)]
    deliver_ratio: f64,

    /// 随机种子，便于复现
    #[arg(short, long)]
    seed: Option<u64>,
}

/// 非有限值按 0 处理，其余截断到 [0, 1]，保证 `gen_bool` 的入参合法
fn delivery_ratio(raw: f64) -> f64 {
    if raw.is_finite() {
        raw.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn grid_size(raw: f64) -> f64 {
    if raw.is_finite() && raw > 0.0 {
        raw
    } else {
        1.0
    }
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let kitchens = args.kitchens.max(1);
    let customers = args.customers.max(1);
    let grid = grid_size(args.grid);
    let deliver_ratio = delivery_ratio(args.deliver_ratio);
    let max_ready_time = args.max_ready_time.max(0);

    let locations: Vec<Location> = (0..kitchens)
        .map(|_| Location::new(rng.gen_range(0.0..grid), rng.gen_range(0.0..grid)))
        .collect();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    for order_id in 1..=args.count {
        let kitchen = rng.gen_range(0..kitchens);
        let request = NewOrderRequest {
            order_id,
            kitchen_id: kitchen + 1,
            customer_id: rng.gen_range(1..=customers),
            ready_time: rng.gen_range(0..=max_ready_time),
            kitchen_location: locations[kitchen as usize],
        };
        serde_json::to_writer(&mut out, &request)?;
        writeln!(out)?;

        if deliver_ratio > 0.0 && rng.gen_bool(deliver_ratio) {
            // 可能落在未分配的订单上，由批处理端拒绝
            let target = rng.gen_range(1..=order_id);
            let update = AdvanceOrderRequest {
                order_id: target,
                status: OrderStatus::Delivered,
            };
            serde_json::to_writer(&mut out, &update)?;
            writeln!(out)?;
        }
    }

    out.flush()
}
