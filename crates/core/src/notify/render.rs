use crate::domain::{AlertEvent, PriceQuote};
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedAlert {
    pub subject: String,
    pub html: String,
    pub sms: String,
}

pub fn rupees(value: Decimal) -> String {
    format!("₹{:.2}", value.round_dp(2))
}

fn optional_rupees(value: Option<Decimal>) -> String {
    value.map(rupees).unwrap_or_else(|| "n/a".to_string())
}

pub fn render_alert(event: &AlertEvent, quote: &PriceQuote) -> RenderedAlert {
    let metal = event.metal.as_str().to_ascii_uppercase();
    let pct = event.threshold.percent();
    let drop_text = format!("{:.2}%", event.drop_pct.round_dp(2));

    let subject = format!("🚨 {metal} Price Alert: {pct}% Drop!");

    let sms = format!(
        "🚨 {metal} PRICE ALERT!\nPrice dropped {pct}%!\nCurrent: {}\nBaseline: {}\nDrop: {drop_text}",
        rupees(event.current_price),
        rupees(event.baseline_price),
    );

    let rows = [
        ("Product", quote.product_name.clone().unwrap_or_else(|| metal.clone())),
        ("Current Price (with 3% GST)", rupees(event.current_price)),
        ("Current Price (without GST)", optional_rupees(quote.price_without_gst)),
        ("Baseline Price", rupees(event.baseline_price)),
        ("Drop", drop_text),
        ("Buy Price", optional_rupees(quote.buy_price)),
        ("Sell Price", optional_rupees(quote.sell_price)),
        (
            "Last Updated",
            quote
                .updated_at
                .clone()
                .unwrap_or_else(|| quote.fetched_at.to_rfc3339()),
        ),
    ];

    let mut table = String::new();
    for (label, value) in rows {
        table.push_str(&format!(
            "<tr><td style=\"padding: 8px; border-bottom: 1px solid #ddd;\"><strong>{}</strong></td>\
             <td style=\"padding: 8px; border-bottom: 1px solid #ddd;\">{}</td></tr>\n",
            escape_html(label),
            escape_html(&value)
        ));
    }

    let html = format!(
        "<html><body style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\n\
         <h1>🪙 Metal Price Alert</h1>\n\
         <h2 style=\"color: #e74c3c;\">{metal} has dropped {pct}% from baseline!</h2>\n\
         <table style=\"width: 100%; border-collapse: collapse;\">\n{table}</table>\n\
         <p style=\"color: #666; font-size: 12px;\">Automated alert from Metal Price Tracker.</p>\n\
         </body></html>\n"
    );

    RenderedAlert { subject, html, sms }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
