// src/services/route_audit.rs

use std::fmt::Write;

use crate::{authz::PermissionMatcher, routes::RouteTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protection {
    Protected,
    Public,
}

impl Protection {
    pub fn label(&self) -> &'static str {
        match self {
            Protection::Protected => "PROTECTED",
            Protection::Public => "PUBLIC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRow {
    pub method: String,
    pub uri: String,
    pub name: String,
    pub status: Protection,
    pub permission: Option<String>,
}

/// Uma linha por rota nomeada. PROTECTED se, e somente se, alguma
/// permissão do catálogo guarda o nome da rota.
pub fn audit(table: &RouteTable, matcher: &PermissionMatcher) -> Vec<AuditRow> {
    table
        .entries()
        .iter()
        .filter_map(|entry| {
            let name = entry.name?;
            let permission = matcher.find_guarding_permission(Some(name)).map(|p| p.name.clone());
            Some(AuditRow {
                method: entry.method.to_string(),
                uri: entry.path.to_string(),
                name: name.to_string(),
                status: if permission.is_some() { Protection::Protected } else { Protection::Public },
                permission,
            })
        })
        .collect()
}

pub fn render(rows: &[AuditRow]) -> String {
    let headers = ["METHOD", "URI", "ROUTE", "STATUS", "PERMISSION"];
    let cells: Vec<[&str; 5]> = rows
        .iter()
        .map(|r| {
            [
                r.method.as_str(),
                r.uri.as_str(),
                r.name.as_str(),
                r.status.label(),
                r.permission.as_deref().unwrap_or("-"),
            ]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let mut out = String::new();
    for line in std::iter::once(headers).chain(cells) {
        let formatted: Vec<String> = line
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!("{:<width$}", cell, width = w))
            .collect();
        let _ = writeln!(out, "{}", formatted.join("  ").trim_end());
    }

    let protected = rows.iter().filter(|r| r.status == Protection::Protected).count();
    let _ = writeln!(out, "\n{} rotas nomeadas, {} protegidas, {} abertas", rows.len(), protected, rows.len() - protected);
    out
}
