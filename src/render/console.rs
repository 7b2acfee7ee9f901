//! Terminal view: interprets draw instructions with tabled output and a
//! little color. This is the only module that writes to the console.

use owo_colors::OwoColorize;
use tabled::Table;
use tabled::settings::Style;

use crate::ui::FeedbackKind;

use super::{DrawOp, View};

fn print_table<T: tabled::Tabled>(title: &str, rows: &[T]) {
    println!("\n{}", title.bold());
    if rows.is_empty() {
        println!("  (none)");
        return;
    }
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

#[derive(Debug, Default)]
pub struct ConsoleView;

impl View for ConsoleView {
    fn apply(&mut self, ops: &[DrawOp]) {
        for op in ops {
            self.draw(op);
        }
    }
}

impl ConsoleView {
    fn draw(&self, op: &DrawOp) {
        match op {
            // The console skips the sweep and prints the settled value.
            DrawOp::Badge(animation) => {
                let value = animation.final_value();
                let rendered = if animation.monetary {
                    format!("{value:.2} ETB")
                } else {
                    format!("{}", value.round() as i64)
                };
                println!("{:<18} {}", animation.badge, rendered.bold());
            }
            DrawOp::PendingList(cards) => {
                println!("\n{}", "Pending rides".bold());
                if cards.is_empty() {
                    println!("  (none)");
                }
                for card in cards {
                    println!(
                        "  #{} {} ({}) {} -> {} at {} | fare {:.2}",
                        card.ride_id,
                        card.user_name,
                        card.vehicle_type,
                        card.pickup_address,
                        card.dest_address,
                        card.request_time,
                        card.fare,
                    );
                    if let Some(note) = &card.note {
                        println!("     note: {note}");
                    }
                    for choice in &card.choices {
                        let marker = if card.selected == Some(choice.id) {
                            "*"
                        } else {
                            " "
                        };
                        println!(
                            "   {marker} [{}] {} ({:.1})",
                            choice.id, choice.name, choice.avg_rating
                        );
                    }
                }
            }
            DrawOp::ActiveTable(rows) => print_table("Active rides", rows),
            DrawOp::DriversTable(rows) => print_table("Drivers", rows),
            DrawOp::PassengersTable(rows) => print_table("Passengers", rows),
            DrawOp::HistoryTable(page) => {
                print_table("Ride history", &page.rows);
                println!(
                    "  page {}/{} ({} rides)",
                    page.page + 1,
                    page.total_pages,
                    page.total_rides
                );
            }
            DrawOp::EarningsTable(rows) => print_table("Driver earnings", rows),
            DrawOp::FeedbackTable(rows) => print_table("Feedback", rows),
            DrawOp::TicketSummary(stats) => {
                println!(
                    "\nTickets: {} open, {} in progress, {} resolved",
                    stats.open.to_string().red(),
                    stats.in_progress.to_string().yellow(),
                    stats.resolved.to_string().green(),
                );
            }
            DrawOp::CommissionRates(rates) => {
                println!("\n{}", "Commission rates".bold());
                println!("  bajaj {:.1}% | car {:.1}%", rates.bajaj_rate, rates.car_rate);
            }
            DrawOp::AdminsTable(rows) => print_table("Admins", rows),
            DrawOp::AnalyticsKpis(kpis) => {
                println!("\n{}", "Analytics".bold());
                println!(
                    "  completed {} | active {} | canceled {} | revenue {:.2} | avg fare {:.2}",
                    kpis.rides_completed,
                    kpis.active_rides_now,
                    kpis.rides_canceled,
                    kpis.total_revenue,
                    kpis.avg_fare,
                );
                println!(
                    "  trends: rides {:+.1}% revenue {:+.1}%",
                    kpis.trends.rides, kpis.trends.revenue
                );
            }
            DrawOp::Chart(spec) => {
                println!("\n{} ({:?})", format!("{:?}", spec.slot).bold(), spec.kind);
                for (label, value) in spec.labels.iter().zip(&spec.data) {
                    println!("  {label:<14} {value:.1}");
                }
            }
            DrawOp::Map(ops) => {
                println!("\n{} {} ops", "Map:".bold(), ops.len());
            }
            DrawOp::NotificationBadge(count) => {
                if *count > 0 {
                    println!("Notifications: {}", count.to_string().yellow());
                }
            }
            DrawOp::NotificationList(items) => {
                for item in items {
                    println!("  - {item}");
                }
            }
            DrawOp::UnreadBadge(count) => {
                if *count > 0 {
                    println!("Unread feedback: {}", count.to_string().yellow());
                }
            }
            DrawOp::Feedback { text, kind } => match kind {
                FeedbackKind::Success => println!("{}", text.green()),
                FeedbackKind::Error => println!("{}", text.red()),
            },
            // Terminal bell.
            DrawOp::PlayChime => print!("\x07"),
        }
    }
}
