// src/ui/report_view.rs

use crossterm::style::{style, Color, Stylize};
use std::io::{self, Write};

use crate::core::models::{CertificateInfo, ProbeResult, SiteReport};

const DATE_DISPLAY: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Colors the text when `styled` is set, leaves it alone otherwise.
fn paint(text: &str, color: Color, styled: bool) -> String {
    if styled {
        style(text).with(color).to_string()
    } else {
        text.to_string()
    }
}

fn heading(text: &str, styled: bool) -> String {
    if styled {
        style(text).bold().underlined().to_string()
    } else {
        text.to_string()
    }
}

/// One value line: the shown value when found, "Not found" when the source had
/// nothing, "Unavailable (reason)" when the probe failed.
fn describe<T>(result: &ProbeResult<T>, styled: bool, show: impl Fn(&T) -> String) -> String {
    match result {
        ProbeResult::Found(value) => show(value),
        ProbeResult::Absent => paint("Not found", Color::Yellow, styled),
        ProbeResult::Failed(reason) => paint(&format!("Unavailable ({reason})"), Color::Red, styled),
    }
}

fn join_or_none<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    let joined = items.into_iter().map(String::as_str).collect::<Vec<_>>().join(", ");
    if joined.is_empty() { "None".to_string() } else { joined }
}

/// Writes the human-readable report.
pub fn render_report(report: &SiteReport, out: &mut impl Write, styled: bool) -> io::Result<()> {
    writeln!(out, "{} {}", heading("Site Information:", styled), report.target.url)?;
    writeln!(out, "Title: {}", describe(&report.title, styled, Clone::clone))?;
    writeln!(out, "Last Updated Date: {}", describe(&report.last_modified, styled, Clone::clone))?;
    writeln!(
        out,
        "First Creation Date: {}",
        describe(&report.whois_creation_date, styled, |date| date.format(DATE_DISPLAY).to_string())
    )?;
    writeln!(out, "Dns Information: {}", describe(&report.dns_addresses, styled, |a| join_or_none(a)))?;
    writeln!(out, "Sub Branches: {}", describe(&report.subdomain_guesses, styled, |s| join_or_none(s)))?;
    writeln!(out, "Firewall Names: {}", describe(&report.firewall_names, styled, |f| join_or_none(f)))?;

    match &report.technologies {
        ProbeResult::Found(found) if !found.is_empty() => {
            let names = found
                .iter()
                .map(|(keyword, category)| format!("{keyword} ({category})"))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(out, "Technologies Used: {}", paint(&names, Color::Green, styled))?;
        }
        ProbeResult::Failed(reason) => {
            writeln!(out, "Technologies Used: No technology identified. ({reason})")?;
        }
        _ => writeln!(out, "Technologies Used: No technology identified.")?,
    }

    if let Some(cert) = report.certificate.found() {
        return render_certificate(cert, out, styled);
    }
    match report.certificate.failure() {
        Some(reason) => writeln!(out, "Certificate Information: No certificate detected. ({reason})"),
        None => writeln!(out, "Certificate Information: No certificate detected."),
    }
}

fn render_certificate(cert: &CertificateInfo, out: &mut impl Write, styled: bool) -> io::Result<()> {
    writeln!(out, "{}", heading("Certificate Information:", styled))?;
    writeln!(out, "Certificate Issuer: {}", cert.issuer)?;
    writeln!(out, "Certificate Start Date: {}", cert.not_before.format(DATE_DISPLAY))?;
    writeln!(out, "Certificate Expiration Date: {}", cert.not_after.format(DATE_DISPLAY))?;
    writeln!(out, "Certificate Validity Period (Days): {}", cert.validity_days)
}

/// Writes the report as pretty-printed JSON.
pub fn render_json(report: &SiteReport, out: &mut impl Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)
}
