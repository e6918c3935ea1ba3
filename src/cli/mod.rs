pub mod refresh;
pub mod serve;
pub mod status;

use crate::core::models::TicketRecord;

pub(crate) fn print_record(record: &TicketRecord) {
    println!("  {:<14} {}", "Ticket:", record.ticket_number);
    println!("  {:<14} {}", "Valid from:", record.valid_from);
    println!("  {:<14} {}", "Valid until:", record.valid_until);
    if let Some(region) = &record.region {
        println!("  {:<14} {}", "Region:", region);
    }
    if let Some(class) = &record.ticket_class {
        println!("  {:<14} {}", "Class:", class);
    }
    println!("  {:<14} {}", "Last updated:", record.last_updated);
    println!("  {:<14} {}", "Status:", record.update_status);
}
