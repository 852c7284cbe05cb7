//! Reporting sink
//!
//! Renders service outputs and the end-of-run summary. The core only hands
//! over structured values; the formats live here.

use crate::application::services::EngineOutput;
use crate::shared::protocol::{AssignmentOutcome, EngineSnapshot, OrderView};
use std::io::{self, Write};

/// Receives every service output plus a final snapshot
pub trait ReportSink {
    fn report(&mut self, output: &EngineOutput) -> io::Result<()>;

    fn summary(&mut self, snapshot: &EngineSnapshot) -> io::Result<()>;
}

/// Human readable console report
pub struct TextReport<W: Write> {
    out: W,
}

impl<W: Write> TextReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn order_line(&mut self, order: &OrderView) -> io::Result<()> {
        writeln!(
            self.out,
            " - Order {}: Kitchen ID - {}, Customer ID - {}, Ready Time - {}, Kitchen Location - {}, Status - {}",
            order.order_id,
            order.kitchen_id,
            order.customer_id,
            order.ready_time,
            order.kitchen_location,
            order.status
        )
    }
}

impl<W: Write> ReportSink for TextReport<W> {
    fn report(&mut self, output: &EngineOutput) -> io::Result<()> {
        match output {
            EngineOutput::Outcome(AssignmentOutcome::Assigned(event)) => {
                writeln!(
                    self.out,
                    "Order {} batched with Order {} (rule {}), assigned to Rider {} at distance {:.2}",
                    event.order_id, event.matched_order_id, event.rule, event.rider_id, event.distance
                )?;
                for order in &event.orders {
                    self.order_line(order)?;
                }
                writeln!(
                    self.out,
                    "Rider {} assigned {} orders: {:?}",
                    event.rider_id,
                    event.rider_orders.len(),
                    event.rider_orders
                )
            }
            EngineOutput::Outcome(AssignmentOutcome::NoMatch { order_id }) => {
                writeln!(self.out, "No matching rule found for Order {}", order_id)
            }
            EngineOutput::Outcome(AssignmentOutcome::NoRiderAvailable {
                order_id,
                matched_order_id,
                rule,
            }) => writeln!(
                self.out,
                "Order {} matches Order {} (rule {}) but no rider is available",
                order_id, matched_order_id, rule
            ),
            EngineOutput::Rejected { order_id, reason } => {
                writeln!(self.out, "Order {} rejected: {}", order_id, reason)
            }
            EngineOutput::Advanced { order_id, status } => {
                writeln!(self.out, "Order {} is now {}", order_id, status)
            }
            EngineOutput::AdvanceFailed { order_id, reason } => {
                writeln!(self.out, "Order {} status unchanged: {}", order_id, reason)
            }
        }
    }

    fn summary(&mut self, snapshot: &EngineSnapshot) -> io::Result<()> {
        let rule = "=".repeat(30);

        writeln!(self.out, "\nOrder details:")?;
        for order in &snapshot.orders {
            writeln!(self.out, "{}", rule)?;
            writeln!(self.out, "Order ID: {}", order.order_id)?;
            writeln!(self.out, "Kitchen ID: {}", order.kitchen_id)?;
            writeln!(self.out, "Customer ID: {}", order.customer_id)?;
            writeln!(self.out, "Ready Time: {}", order.ready_time)?;
            writeln!(self.out, "Kitchen Location: {}", order.kitchen_location)?;
            writeln!(self.out, "Status: {}", order.status)?;
            match order.assigned_rider {
                Some(rider_id) => writeln!(self.out, "Assigned to Rider: Yes ({})", rider_id)?,
                None => writeln!(self.out, "Assigned to Rider: No")?,
            }
        }

        writeln!(self.out, "{}", "=".repeat(60))?;
        writeln!(self.out, "\nSummary:")?;
        for rider in &snapshot.riders {
            writeln!(self.out, "{}", rule)?;
            writeln!(self.out, "Rider ID: {}", rider.rider_id)?;
            writeln!(self.out, "Location: {}", rider.location)?;
            writeln!(self.out, "Number of orders assigned: {}", rider.order_count)?;
            writeln!(self.out, "Assigned Orders:")?;
            if rider.assigned_orders.is_empty() {
                writeln!(self.out, "None")?;
            }
            for order_id in &rider.assigned_orders {
                match snapshot.orders.iter().find(|o| o.order_id == *order_id) {
                    Some(order) => self.order_line(order)?,
                    None => writeln!(self.out, " - Order {}", order_id)?,
                }
            }
        }
        self.out.flush()
    }
}

/// One JSON object per line, for piping into other tools
pub struct JsonReport<W: Write> {
    out: W,
}

impl<W: Write> JsonReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for JsonReport<W> {
    fn report(&mut self, output: &EngineOutput) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, output)?;
        writeln!(self.out)
    }

    fn summary(&mut self, snapshot: &EngineSnapshot) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, &serde_json::json!({ "type": "summary", "snapshot": snapshot }))?;
        writeln!(self.out)?;
        self.out.flush()
    }
}
