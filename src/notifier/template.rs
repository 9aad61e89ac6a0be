//! Handlebars rendering of notification messages

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde_json::{Value, json};

use super::{NotifyParams, Operation};
use crate::config::TemplatesConfig;
use crate::terraform::{ParseResult, resource_address};

const PLAN_TEMPLATE_NAME: &str = "plan";
const APPLY_TEMPLATE_NAME: &str = "apply";

pub const DEFAULT_PLAN_TEMPLATE: &str = r##"## {{title}}{{#if ci.link}} ([CI link]({{ci.link}})){{/if}}

{{#if has_parse_error}}
:warning: It failed to parse the result.

<details><summary>Details (Click me)</summary>

```
{{combined_output}}
```

</details>
{{else}}
{{#if has_plan_error}}
:x: **Plan failed**

```
{{result}}
```
{{else}}
{{#if has_destroy}}
:warning: **This plan destroys resources.**

{{/if}}
`{{result}}`
{{#if created_addresses}}

* Create
{{#each created_addresses}}
  * {{this}}
{{/each}}
{{/if}}
{{#if updated_addresses}}

* Update
{{#each updated_addresses}}
  * {{this}}
{{/each}}
{{/if}}
{{#if deleted_addresses}}

* Delete
{{#each deleted_addresses}}
  * {{this}}
{{/each}}
{{/if}}
{{#if replaced_addresses}}

* Replace
{{#each replaced_addresses}}
  * {{this}}
{{/each}}
{{/if}}
{{/if}}
{{#if outside_terraform}}

<details><summary>:information_source: Objects have changed outside of Terraform</summary>

```
{{outside_terraform}}
```

</details>
{{/if}}
{{#if changed_result}}

<details><summary>Change Result (Click me)</summary>

```
{{changed_result}}
```

</details>
{{/if}}
{{#if warning}}

## :warning: Warnings :warning:

```
{{warning}}
```
{{/if}}
{{/if}}
"##;

pub const DEFAULT_APPLY_TEMPLATE: &str = r##"## {{title}}{{#if ci.link}} ([CI link]({{ci.link}})){{/if}}

{{#if has_parse_error}}
:warning: It failed to parse the result.

<details><summary>Details (Click me)</summary>

```
{{combined_output}}
```

</details>
{{else}}
{{#if failed}}
:x: **Apply failed**
{{else}}
:white_check_mark: **Apply succeeded**
{{/if}}

```
{{result}}
```
{{/if}}
"##;

/// Renders plan and apply messages from built-in or configured templates
pub struct MessageRenderer {
    handlebars: Handlebars<'static>,
}

impl MessageRenderer {
    pub fn new(templates: &TemplatesConfig) -> Result<Self> {
        let mut handlebars = Handlebars::new();

        // Messages are markdown, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);

        handlebars
            .register_template_string(
                PLAN_TEMPLATE_NAME,
                templates.plan.as_deref().unwrap_or(DEFAULT_PLAN_TEMPLATE),
            )
            .context("Failed to register plan template")?;

        handlebars
            .register_template_string(
                APPLY_TEMPLATE_NAME,
                templates.apply.as_deref().unwrap_or(DEFAULT_APPLY_TEMPLATE),
            )
            .context("Failed to register apply template")?;

        Ok(Self { handlebars })
    }

    pub fn render(
        &self,
        operation: Operation,
        params: &NotifyParams,
        result: &ParseResult,
    ) -> Result<String> {
        let name = match operation {
            Operation::Plan => PLAN_TEMPLATE_NAME,
            Operation::Apply => APPLY_TEMPLATE_NAME,
        };

        let context = build_context(operation, params, result)?;

        self.handlebars
            .render(name, &context)
            .with_context(|| format!("Failed to render {} template", name))
    }
}

/// Template variables: every `ParseResult` field plus run metadata
fn build_context(operation: Operation, params: &NotifyParams, result: &ParseResult) -> Result<Value> {
    let mut context = serde_json::to_value(result).context("Failed to serialize parse result")?;

    let addresses = |phrases: &[String]| -> Vec<String> {
        phrases
            .iter()
            .map(|p| resource_address(p).to_string())
            .collect()
    };

    let extra = json!({
        "title": operation.title(),
        "failed": !result.exit_code.is_pass(),
        "created_addresses": addresses(&result.created_resources),
        "updated_addresses": addresses(&result.updated_resources),
        "deleted_addresses": addresses(&result.deleted_resources),
        "replaced_addresses": addresses(&result.replaced_resources),
        "ci": params.ci,
        "command_exit_code": params.exit_code,
        "stdout": params.stdout,
        "stderr": params.stderr,
        "combined_output": params.combined_output,
        "generated_at": chrono::Utc::now().to_rfc3339(),
    });

    if let (Some(target), Value::Object(extra)) = (context.as_object_mut(), extra) {
        target.extend(extra);
    }

    Ok(context)
}
