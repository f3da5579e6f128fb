//! Notebook template: ordered cells rendered with the same substitution contract,
//! serialized as nbformat 4.5 JSON.
use serde_json::{json, Value};

use super::{bodies, substitute, Params};
use crate::errors::ScaffoldError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Markdown,
    Code,
}

#[derive(Debug)]
pub struct CellTemplate {
    pub kind: CellKind,
    pub source: &'static str,
}

pub(crate) const CELLS: &[CellTemplate] = &[
    CellTemplate {
        kind: CellKind::Markdown,
        source: bodies::NOTEBOOK_INTRO,
    },
    CellTemplate {
        kind: CellKind::Code,
        source: bodies::NOTEBOOK_AUTORELOAD,
    },
    CellTemplate {
        kind: CellKind::Code,
        source: bodies::NOTEBOOK_IMPORTS,
    },
    CellTemplate {
        kind: CellKind::Code,
        source: bodies::NOTEBOOK_MAIN,
    },
];

/// Jupyter stores cell sources as a list of lines, each keeping its newline except the last.
fn source_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text.split_inclusive('\n').map(str::to_string).collect();
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn cell_json(index: usize, kind: CellKind, source: &str) -> Value {
    let id = format!("cell-{}", index + 1);
    match kind {
        CellKind::Markdown => json!({
            "cell_type": "markdown",
            "id": id,
            "metadata": {},
            "source": source_lines(source),
        }),
        CellKind::Code => json!({
            "cell_type": "code",
            "execution_count": null,
            "id": id,
            "metadata": {},
            "outputs": [],
            "source": source_lines(source),
        }),
    }
}

pub(crate) fn render_cells(
    cells: &[CellTemplate],
    declared: &[&str],
    params: &Params,
) -> Result<String, ScaffoldError> {
    let rendered: Vec<Value> = cells
        .iter()
        .enumerate()
        .map(|(i, c)| cell_json(i, c.kind, &substitute(c.source, declared, params)))
        .collect();
    let doc = json!({
        "cells": rendered,
        "metadata": {
            "kernelspec": {
                "display_name": "Python 3",
                "language": "python",
                "name": "python3"
            },
            "language_info": {
                "name": "python"
            }
        },
        "nbformat": 4,
        "nbformat_minor": 5
    });
    let mut out = serde_json::to_string_pretty(&doc)
        .map_err(|e| ScaffoldError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
    out.push('\n');
    Ok(out)
}
