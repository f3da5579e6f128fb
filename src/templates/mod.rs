//! Template registry and `{{param}}` substitution.
//!
//! Rendering is a single left-to-right pass: only `{{name}}` where `name` is a
//! parameter declared by the template is replaced, substituted text is never
//! re-scanned, and every other brace sequence is copied through untouched.
use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::errors::ScaffoldError;

mod bodies;
pub mod notebook;
pub mod quote;

pub use notebook::{CellKind, CellTemplate};

/// Bumped whenever a template body or parameter set changes.
pub const TEMPLATE_SET_VERSION: u32 = 3;

pub mod param {
    pub const EXPERIMENT_NAME: &str = "experiment_name";
    pub const EXPERIMENT_NAME_LITERAL: &str = "experiment_name_literal";
    pub const EXPERIMENT_IDENT: &str = "experiment_ident";
    pub const REPORT_TITLE_YAML: &str = "report_title_yaml";
    pub const REPORT_HTML_LITERAL: &str = "report_html_literal";
    pub const RENDER_COMMAND_LITERAL: &str = "render_command_literal";
    pub const TOKEN: &str = "token";
    pub const URL: &str = "url";
    pub const URL_YAML: &str = "url_yaml";
    pub const DATE: &str = "date";
    pub const TEMPLATE_VERSION: &str = "template_version";
    pub const ISSUE_NUMBER: &str = "issue_number";
    pub const ISSUE_TITLE: &str = "issue_title";
    pub const ISSUE_BODY: &str = "issue_body";
    pub const ISSUE_LINK: &str = "issue_link";
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum TemplateId {
    Metadata,
    DesignMd,
    DesignOrg,
    DesignMdFromIssue,
    DesignOrgFromIssue,
    MainScript,
    Report,
    Pipeline,
    BasicTest,
    Notebook,
}

impl TemplateId {
    pub const ALL: [TemplateId; 10] = [
        TemplateId::Metadata,
        TemplateId::DesignMd,
        TemplateId::DesignOrg,
        TemplateId::DesignMdFromIssue,
        TemplateId::DesignOrgFromIssue,
        TemplateId::MainScript,
        TemplateId::Report,
        TemplateId::Pipeline,
        TemplateId::BasicTest,
        TemplateId::Notebook,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Metadata => "metadata",
            TemplateId::DesignMd => "design-md",
            TemplateId::DesignOrg => "design-org",
            TemplateId::DesignMdFromIssue => "design-md-from-issue",
            TemplateId::DesignOrgFromIssue => "design-org-from-issue",
            TemplateId::MainScript => "main-script",
            TemplateId::Report => "report",
            TemplateId::Pipeline => "pipeline",
            TemplateId::BasicTest => "basic-test",
            TemplateId::Notebook => "notebook",
        }
    }
}

#[derive(Debug)]
pub enum TemplateBody {
    Text(&'static str),
    Notebook(&'static [CellTemplate]),
}

#[derive(Debug)]
pub struct TemplateSpec {
    pub id: TemplateId,
    pub body: TemplateBody,
    pub required: &'static [&'static str],
}

use param::*;

const NAME_DATE: &[&str] = &[EXPERIMENT_NAME, DATE];
const ISSUE_PARAMS: &[&str] = &[
    EXPERIMENT_NAME,
    DATE,
    ISSUE_NUMBER,
    ISSUE_TITLE,
    ISSUE_BODY,
    ISSUE_LINK,
];

static REGISTRY: Lazy<Vec<TemplateSpec>> = Lazy::new(|| {
    vec![
        TemplateSpec {
            id: TemplateId::Metadata,
            body: TemplateBody::Text(bodies::METADATA),
            required: &[EXPERIMENT_NAME, TOKEN, URL, DATE, TEMPLATE_VERSION],
        },
        TemplateSpec {
            id: TemplateId::DesignMd,
            body: TemplateBody::Text(bodies::DESIGN_MD),
            required: NAME_DATE,
        },
        TemplateSpec {
            id: TemplateId::DesignOrg,
            body: TemplateBody::Text(bodies::DESIGN_ORG),
            required: NAME_DATE,
        },
        TemplateSpec {
            id: TemplateId::DesignMdFromIssue,
            body: TemplateBody::Text(bodies::DESIGN_MD_FROM_ISSUE),
            required: ISSUE_PARAMS,
        },
        TemplateSpec {
            id: TemplateId::DesignOrgFromIssue,
            body: TemplateBody::Text(bodies::DESIGN_ORG_FROM_ISSUE),
            required: ISSUE_PARAMS,
        },
        TemplateSpec {
            id: TemplateId::MainScript,
            body: TemplateBody::Text(bodies::MAIN_SCRIPT),
            required: &[EXPERIMENT_NAME, EXPERIMENT_NAME_LITERAL],
        },
        TemplateSpec {
            id: TemplateId::Report,
            body: TemplateBody::Text(bodies::REPORT),
            required: &[
                EXPERIMENT_NAME,
                EXPERIMENT_NAME_LITERAL,
                REPORT_TITLE_YAML,
                URL,
                URL_YAML,
                DATE,
            ],
        },
        TemplateSpec {
            id: TemplateId::Pipeline,
            body: TemplateBody::Text(bodies::PIPELINE),
            required: &[REPORT_HTML_LITERAL, RENDER_COMMAND_LITERAL],
        },
        TemplateSpec {
            id: TemplateId::BasicTest,
            body: TemplateBody::Text(bodies::BASIC_TEST),
            required: &[EXPERIMENT_IDENT, EXPERIMENT_NAME_LITERAL],
        },
        TemplateSpec {
            id: TemplateId::Notebook,
            body: TemplateBody::Notebook(notebook::CELLS),
            required: &[EXPERIMENT_NAME, URL, DATE],
        },
    ]
});

/// Look up a template; every `TemplateId` is registered.
pub fn spec(id: TemplateId) -> &'static TemplateSpec {
    REGISTRY
        .iter()
        .find(|s| s.id == id)
        .unwrap_or_else(|| unreachable!("template {} not registered", id.as_str()))
}

/// Named substitution values, ordered for stable debug output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: BTreeMap<&'static str, String>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(key, value.into());
        self
    }

    pub fn insert(&mut self, key: &'static str, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Render a registered template. Fails if any declared parameter is absent.
pub fn render(id: TemplateId, params: &Params) -> Result<String, ScaffoldError> {
    let spec = spec(id);
    for p in spec.required {
        if params.get(p).is_none() {
            return Err(ScaffoldError::MissingParam {
                template: id.as_str(),
                param: *p,
            });
        }
    }
    match spec.body {
        TemplateBody::Text(body) => Ok(substitute(body, spec.required, params)),
        TemplateBody::Notebook(cells) => notebook::render_cells(cells, spec.required, params),
    }
}

/// Replace `{{name}}` for declared names present in `params`; copy everything else verbatim.
pub(crate) fn substitute(body: &str, declared: &[&str], params: &Params) -> String {
    let mut out = String::with_capacity(body.len() + 64);
    let mut rest = body;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let replaced = after_open.find("}}").and_then(|end| {
            let key = &after_open[..end];
            if declared.contains(&key) {
                params.get(key).map(|v| (v, end))
            } else {
                None
            }
        });
        match replaced {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after_open[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after_open;
            }
        }
    }
    out.push_str(rest);
    out
}
