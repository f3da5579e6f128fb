//! Static template bodies. Placeholders are `{{param}}`; every other brace is literal.

pub(crate) const METADATA: &str = "name={{experiment_name}}
token={{token}}
url={{url}}
created={{date}}
template_version={{template_version}}
";

pub(crate) const PIPELINE: &str = r#"rule run_main:
    input:
        # Define any input files here, e.g. "../some_global_data.csv"
    output:
        # If main.py produces new data files, list them here
    script:
        "main.py"

rule render_report:
    input:
        "report.qmd"
    output:
        # The rendered HTML goes into ../../reports/
        {{report_html_literal}}
    shell:
        {{render_command_literal}}
"#;

pub(crate) const MAIN_SCRIPT: &str = r#"#!/usr/bin/env python3
# Main script for the {{experiment_name}} experiment.

EXPERIMENT_NAME = {{experiment_name_literal}}


def main():
    print(f"Running {EXPERIMENT_NAME} experiment...")


if __name__ == "__main__":
    main()
"#;

pub(crate) const REPORT: &str = r#"---
title: {{report_title_yaml}}
date: {{date}}
experiment-url: {{url_yaml}}
format:
  html:
    code-fold: true
    code-tools: true
    code-summary: "Show the code"
    theme: cosmo
    toc: true
    toc-depth: 3
    toc-location: left
    fig-width: 10
---


# {{experiment_name}}

This is the Quarto report for the **{{experiment_name}}** experiment.

Published at <{{url}}>.


## Setup and Imports

```{python}
%load_ext autoreload # leave these to always run latest available modules
%autoreload 2

import sys # modify these as needed
import os
import matplotlib.pyplot as plt
import numpy as np
import pandas as pd
from pathlib import Path
import random
from matplotlib.lines import Line2D
from IPython.display import display, Markdown

from main import main
```

```{python}
# You can embed Python code here, referencing local data
print("Hello from Quarto in " + {{experiment_name_literal}} + "!")

main()
```
"#;

pub(crate) const BASIC_TEST: &str = r#"import pytest

EXPERIMENT_NAME = {{experiment_name_literal}}


def test_{{experiment_ident}}_sanity():
    assert EXPERIMENT_NAME == {{experiment_name_literal}}, "Basic test for " + EXPERIMENT_NAME
"#;

pub(crate) const DESIGN_MD: &str = "# {{experiment_name}} Design

Created: {{date}}

Describe your experiment's motivation, approach, and tasks here.

Tasks:
- [ ] ...
";

pub(crate) const DESIGN_ORG: &str = "#+TITLE: {{experiment_name}} Design
#+DATE: {{date}}

* Motivation
Describe your experiment's motivation here.

* Approach

* Tasks
- [ ] ...
";

pub(crate) const DESIGN_MD_FROM_ISSUE: &str = "# {{experiment_name}} Design

Created: {{date}}

Issue #{{issue_number}}: {{issue_title}}
Link: {{issue_link}}

## Issue description

{{issue_body}}

## Approach

Describe how this experiment addresses the issue.

Tasks:
- [ ] ...
";

pub(crate) const DESIGN_ORG_FROM_ISSUE: &str = "#+TITLE: {{experiment_name}} Design
#+DATE: {{date}}

* Issue #{{issue_number}}: {{issue_title}}
Link: {{issue_link}}

#+begin_quote
{{issue_body}}
#+end_quote

* Approach
Describe how this experiment addresses the issue.

* Tasks
- [ ] ...
";

pub(crate) const NOTEBOOK_INTRO: &str = "# {{experiment_name}} scratchpad

Exploration notebook for [{{experiment_name}}]({{url}}), created {{date}}.";

pub(crate) const NOTEBOOK_AUTORELOAD: &str = "%load_ext autoreload
%autoreload 2";

pub(crate) const NOTEBOOK_IMPORTS: &str = "import matplotlib.pyplot as plt
import numpy as np
import pandas as pd
from pathlib import Path

DATA_DIR = Path(\"processed_data\")
FIGURES_DIR = Path(\"figures\")";

pub(crate) const NOTEBOOK_MAIN: &str = "from main import main

main()";
