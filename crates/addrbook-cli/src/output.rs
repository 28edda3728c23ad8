//! Terminal output helpers

use addrbook_client::api::{Address, User};
use console::{style, Emoji};

static CHECK: Emoji<'_, '_> = Emoji("✅ ", "+ ");
static ERROR: Emoji<'_, '_> = Emoji("❌ ", "x ");
static HOME: Emoji<'_, '_> = Emoji("🏠 ", "* ");

pub fn success(msg: &str) {
    println!("{}{}", CHECK, style(msg).green());
}

pub fn error(msg: &str) {
    println!("{}{}", ERROR, style(msg).red());
}

pub fn hint(msg: &str) {
    println!("{}", style(msg).dim());
}

pub fn user(user: &User) {
    println!(
        "{} {} {}",
        style("Signed in as").bold(),
        style(&user.username).cyan(),
        style(format!("<{}>", user.email)).dim()
    );
}

pub fn addresses(addresses: &[Address]) {
    println!();
    println!("{}", style("My Addresses").bold());
    if addresses.is_empty() {
        hint("  No addresses yet. Use `add` to create one.");
    }
    for address in addresses {
        println!("{}", format_address(address));
    }
    println!();
}

/// One list row: id, default marker and the address on one line.
pub fn format_address(address: &Address) -> String {
    let marker = if address.is_default {
        format!("{}", HOME)
    } else {
        "  ".to_string()
    };
    format!(
        "  {:>4}  {}{}",
        style(format!("#{}", address.id)).dim(),
        marker,
        address.one_line()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(is_default: bool) -> Address {
        Address {
            id: 12,
            u_id: 1,
            addr_1: "1 Main St".into(),
            addr_2: Some("Apt 4".into()),
            zip: "10115".into(),
            city: "Berlin".into(),
            country: "DE".into(),
            is_default,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_row_contains_id_and_address() {
        console::set_colors_enabled(false);
        let row = format_address(&address(false));
        assert!(row.contains("#12"));
        assert!(row.ends_with("1 Main St, Apt 4, 10115 Berlin, DE"));
    }

    #[test]
    fn test_default_row_is_marked() {
        console::set_colors_enabled(false);
        let plain = format_address(&address(false));
        let marked = format_address(&address(true));
        assert_ne!(plain, marked);
    }
}
