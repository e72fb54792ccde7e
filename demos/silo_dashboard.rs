//! # 筒倉儀表板範例
//!
//! 這個範例展示一天內的出入庫流程：
//! - 三座筒倉，其中一座限定玉米
//! - 多家供應商分批入庫
//! - 出庫時產生先進先出提取明細
//! - 容量與庫存不足的受理失敗
//! - 使用率統計與彙總報表

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use silo::*;

fn at(hour: u32) -> Result<DateTime<Utc>> {
    Utc.with_ymd_and_hms(2025, 11, 3, hour, 0, 0)
        .single()
        .ok_or_else(|| anyhow::anyhow!("無效時間: {hour} 時"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("🌾 ===== 筒倉庫存範例 =====");
    println!();

    // ========== 1. 建立筒倉 ==========
    println!("🏗️  步驟 1: 登錄筒倉");
    let store = InMemoryStore::new().with_silos([
        Silo::new("S1", "North Silo", Decimal::from(10_000)),
        Silo::new("S2", "South Silo", Decimal::from(6_000)).with_material_type("corn"),
        Silo::new("S3", "Spare Silo", Decimal::from(2_000)),
    ]);
    let service = InventoryService::new(store, LedgerConfig::default());
    for silo in service.store().list_silos(None)? {
        println!(
            "   ✓ {} {}：容量 {}，物料 {}",
            silo.id,
            silo.name,
            silo.capacity,
            silo.material_type.as_deref().unwrap_or("不限")
        );
    }
    println!();

    // ========== 2. 入庫 ==========
    println!("📥 步驟 2: 收料入庫");
    let receipts = vec![
        InboundMovement::new("S1", Decimal::from(5_000), at(6)?)
            .with_product("Wheat")
            .with_supplier("Green Farm")
            .with_operator("alice")
            .with_lot_number("LOT-0601")
            .with_quality("moisture", "12.8"),
        InboundMovement::new("S1", Decimal::from(3_000), at(7)?)
            .with_product("Wheat")
            .with_supplier("Hill Farm")
            .with_operator("alice"),
        InboundMovement::new("S2", Decimal::from(4_000), at(8)?)
            .with_product("Corn")
            .with_supplier("Green Farm")
            .with_material_type("corn")
            .with_operator("bob"),
    ];
    for receipt in receipts {
        let accepted = service.receive(receipt)?;
        println!(
            "   ✓ {} 收 {} {}（{}）",
            accepted.silo_id,
            accepted.quantity,
            accepted.product.as_deref().unwrap_or("-"),
            accepted.supplier.as_deref().unwrap_or("-")
        );
    }
    println!();

    // ========== 3. 出庫與提取明細 ==========
    println!("📤 步驟 3: 出庫");
    let dispatched = service.dispatch(
        OutboundMovement::new("S1", Decimal::from(6_000), at(10)?)
            .with_product("Wheat")
            .with_destination("Mill #2")
            .with_operator("carol"),
    )?;
    println!(
        "   ✓ S1 出 {} → {}",
        dispatched.quantity,
        dispatched.destination.as_deref().unwrap_or("-")
    );
    for line in &dispatched.withdrawal_plan.lines {
        println!(
            "     - 批次 {} 取 {}（{}）",
            line.source_inbound_id,
            line.quantity_taken,
            line.supplier.as_deref().unwrap_or("-")
        );
    }
    println!("   明細 JSON: {}", dispatched.withdrawal_plan.to_json()?);
    println!();

    // ========== 4. 受理失敗 ==========
    println!("⛔ 步驟 4: 受理檢查");
    let attempts: Vec<(&str, std::result::Result<(), SiloError>)> = vec![
        (
            "S3 入庫 2500",
            service
                .receive(InboundMovement::new("S3", Decimal::from(2_500), at(11)?))
                .map(|_| ()),
        ),
        (
            "S1 出庫 2500",
            service
                .dispatch(OutboundMovement::new("S1", Decimal::from(2_500), at(11)?))
                .map(|_| ()),
        ),
        (
            "S2 入庫小麥",
            service
                .receive(
                    InboundMovement::new("S2", Decimal::from(10), at(11)?)
                        .with_material_type("wheat"),
                )
                .map(|_| ()),
        ),
        (
            "S9 入庫",
            service
                .receive(InboundMovement::new("S9", Decimal::from(10), at(11)?))
                .map(|_| ()),
        ),
    ];
    for (label, outcome) in attempts {
        match outcome {
            Ok(()) => println!("   ✓ {label}"),
            Err(err) => println!("   ⚠ {label}: {err}"),
        }
    }
    println!();

    // ========== 5. 料位 ==========
    println!("📊 步驟 5: 筒倉料位");
    let thresholds = service.config().thresholds;
    for level in service.silo_levels(None)? {
        println!(
            "   {} {:>6} / {:<6} {:>6}% [{}] 批次 {}",
            level.silo.id,
            level.current_quantity,
            level.silo.capacity,
            level.utilization_percentage.round_dp(1),
            level.bucket(&thresholds).label(),
            level.available_batches.len()
        );
        if let Some(oldest) = level.oldest_batch() {
            println!(
                "     最舊批次: {} 剩 {}（{}）",
                oldest.inbound_id, oldest.quantity, oldest.created_at
            );
        }
    }
    println!();

    // ========== 6. 統計 ==========
    println!("📈 步驟 6: 統計");
    let stats = service.fleet_stats()?;
    println!(
        "   筒倉 {} 座：空 {}、低 {}、中 {}、高 {}、滿 {}",
        stats.silo_count, stats.empty, stats.low, stats.medium, stats.high, stats.full
    );
    println!(
        "   總量 {} / {}（{}%），剩餘空間 {}",
        stats.total_used,
        stats.total_capacity,
        stats.overall_utilization.round_dp(1),
        stats.total_headroom()
    );

    let by_supplier = service.inbound_breakdown(&MovementFilter::all(), GroupBy::Supplier)?;
    println!("   入庫（按供應商）:");
    for (supplier, quantity) in &by_supplier {
        println!("     - {supplier}: {quantity}");
    }

    let by_product =
        service.outbound_breakdown(&MovementFilter::all(), GroupBy::Product)?;
    println!("   出庫（按產品）:");
    for (product, quantity) in &by_product {
        println!("     - {product}: {quantity}");
    }

    println!();
    println!("✅ 完成");

    Ok(())
}
