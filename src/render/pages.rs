use super::{badge, escape, layout, Alert, Category};
use crate::form::{BoundForm, FieldSpec};
use crate::model::{ColumnDescriptor, ColumnSet, FieldRole, ModelDescriptor, Operation, ValueType};
use crate::service::display_value;
use crate::state::AppState;
use serde_json::Value;

pub fn index_page(state: &AppState) -> String {
    let mut body = String::from("<ul class=\"models\">");
    for model in state.registry.models() {
        let ops: Vec<String> = model
            .operations()
            .into_iter()
            .map(|op| {
                format!(
                    "<a href=\"{}\">{}</a>",
                    escape(&state.settings.url(&format!("/{}", model.operation(op).route()))),
                    op
                )
            })
            .collect();
        body.push_str(&format!(
            "<li><a href=\"{}\">{}</a> {}</li>",
            escape(&state.settings.url(&format!("/{}/", model.name()))),
            escape(model.name()),
            ops.join(" ")
        ));
    }
    body.push_str("</ul>");
    layout(state, "Models", None, &[], &body)
}

/// Link to an operation view prefilled with `filter_<pk>=<value>`.
fn row_links(state: &AppState, model: &ModelDescriptor, pk: Option<&ColumnDescriptor>, row: &Value) -> String {
    let Some(pk) = pk else {
        return String::new();
    };
    let Some(value) = row.get(&pk.name).filter(|v| !v.is_null()) else {
        return String::new();
    };
    let field = format!("{}{}", FieldRole::Filter.prefix(), pk.name);
    let Ok(query) = serde_urlencoded::to_string([(field.as_str(), display_value(value).as_str())]) else {
        return String::new();
    };
    model
        .operations()
        .into_iter()
        .filter(|op| *op != Operation::Create)
        .map(|op| {
            let href = format!(
                "{}?{}",
                state.settings.url(&format!("/{}", model.operation(op).route())),
                query
            );
            format!("<a href=\"{}\">{}</a>", escape(&href), op)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn rows_table(
    state: &AppState,
    model: &ModelDescriptor,
    columns: &ColumnSet,
    rows: &[Value],
    with_links: bool,
) -> String {
    let mut out = String::from("<table class=\"rows\"><thead><tr>");
    for c in &columns.visible {
        out.push_str(&format!("<th>{}</th>", escape(&c.name)));
    }
    if with_links {
        out.push_str("<th></th>");
    }
    out.push_str("</tr></thead><tbody>");
    if rows.is_empty() {
        out.push_str(&format!(
            "<tr><td colspan=\"{}\">No entries.</td></tr>",
            columns.visible.len() + usize::from(with_links)
        ));
    }
    let pk = columns.primary_key();
    for row in rows {
        out.push_str("<tr>");
        for c in &columns.visible {
            let cell = row.get(&c.name).unwrap_or(&Value::Null);
            out.push_str(&format!("<td>{}</td>", escape(&display_value(cell))));
        }
        if with_links {
            out.push_str(&format!("<td>{}</td>", row_links(state, model, pk, row)));
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
    out
}

pub fn listing_page(state: &AppState, model: &ModelDescriptor, columns: &ColumnSet, rows: &[Value]) -> String {
    let mut body = String::from("<p class=\"operations\">");
    for op in model.operations() {
        body.push_str(&format!(
            "<a href=\"{}\">{}</a> ",
            escape(&state.settings.url(&format!("/{}", model.operation(op).route()))),
            op
        ));
    }
    body.push_str("</p>");
    body.push_str(&rows_table(state, model, columns, rows, true));
    layout(state, model.name(), Some(model.name()), &[], &body)
}

fn column_badges(c: &ColumnDescriptor) -> String {
    let mut out = badge(c.value_type.as_str(), None);
    if c.primary_key {
        out.push_str(&badge("PK", Some(Category::Primary)));
    } else if c.foreign_key {
        out.push_str(&badge("FK", Some(Category::Primary)));
    }
    if !c.nullable() {
        out.push_str(&badge("NOT NULLABLE", Some(Category::Danger)));
    }
    out
}

fn input(field: &FieldSpec, raw: Option<&str>) -> String {
    let name = escape(&field.name);
    let value = escape(raw.unwrap_or(""));
    let mut attrs = String::new();
    if field.required {
        attrs.push_str(" required");
    }
    if field.disabled {
        attrs.push_str(" disabled");
    }
    if let Some(p) = field.placeholder {
        attrs.push_str(&format!(" placeholder=\"{}\"", p));
    }
    match field.column.value_type {
        ValueType::Bool => ["True", "False", "None"]
            .iter()
            .map(|choice| {
                let checked = if raw == Some(*choice) { " checked" } else { "" };
                format!(
                    "<label><input type=\"radio\" name=\"{}\" value=\"{}\"{}{}> {}</label>",
                    name, choice, checked, attrs, choice
                )
            })
            .collect::<Vec<_>>()
            .join(" "),
        other => {
            let kind = match other {
                ValueType::Int => "number\" step=\"1",
                ValueType::Float | ValueType::Decimal => "number\" step=\"any",
                ValueType::Date => "date",
                ValueType::DateTime => "datetime-local",
                _ => "text",
            };
            format!(
                "<input type=\"{}\" id=\"{}\" name=\"{}\" value=\"{}\"{}>",
                kind, name, name, value, attrs
            )
        }
    }
}

fn fieldset(form: &BoundForm, role: FieldRole, legend: &str) -> String {
    let mut out = format!("<fieldset class=\"{}\"><legend>{}</legend>", legend.to_lowercase(), legend);
    for field in form.schema.fields_with_role(role) {
        let errors: String = form
            .errors()
            .get(&field.name)
            .iter()
            .map(|e| format!("<small class=\"text-danger\">{}</small>", escape(e)))
            .collect();
        out.push_str(&format!(
            "<div class=\"field\"><label for=\"{}\">{}</label> {} {}{}</div>",
            escape(&field.name),
            escape(&field.column.name),
            column_badges(&field.column),
            input(field, form.raw(&field.name)),
            errors
        ));
    }
    out.push_str("</fieldset>");
    out
}

/// Everything the operation page shows besides the form itself.
pub struct OperationView<'a> {
    pub model: &'a ModelDescriptor,
    pub operation: Operation,
    pub columns: &'a ColumnSet,
    pub form: &'a BoundForm,
    pub rows: Option<&'a [Value]>,
    pub alerts: Vec<Alert>,
}

pub fn operation_page(state: &AppState, view: OperationView<'_>) -> String {
    let model_op = view.model.operation(view.operation);
    let action = state.settings.url(&format!("/{}", model_op.route()));
    let method = if view.operation == Operation::Read { "get" } else { "post" };

    let mut alerts = view.alerts;
    if !view.form.schema.blocked_by.is_empty() {
        alerts.insert(
            0,
            Alert::new(
                Category::Warning,
                format!(
                    "excluded required columns prevent create: {}",
                    view.form.schema.blocked_by.join(", ")
                ),
            ),
        );
    }

    let mut body = format!(
        "<form method=\"{}\" action=\"{}\" id=\"{}\">",
        method,
        escape(&action),
        escape(&model_op.endpoint_with(&state.settings.name))
    );
    for &role in view.operation.field_roles() {
        let legend = match role {
            FieldRole::Filter => "Filter",
            FieldRole::Insert => "Values",
        };
        body.push_str(&fieldset(view.form, role, legend));
    }
    body.push_str("<button type=\"submit\">Confirm</button></form>");
    if let Some(rows) = view.rows {
        body.push_str(&rows_table(state, view.model, view.columns, rows, false));
    }
    let title = format!("{} {}", view.model.name(), view.operation);
    layout(state, &title, Some(&model_op.endpoint()), &alerts, &body)
}
