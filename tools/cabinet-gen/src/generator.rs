//! JavaScript cabinet class generator

use anyhow::{Context, Result};
use cabinet_shared::GeneratorConfig;
use handlebars::Handlebars;
use serde::Serialize;

use crate::schema::{CabinetDimensions, Component};

const CLASS_TEMPLATE_NAME: &str = "cabinet_class";
const CLASS_TEMPLATE: &str = include_str!("../templates/cabinet_class.js.hbs");

#[derive(Debug, Serialize)]
struct ComponentContext<'a> {
    filename: &'a str,
    /// Property name, escaped for a single-quoted string
    key: String,
    /// `<folder>/<file>`, appended to `basePath` inside a template literal
    path: String,
}

#[derive(Debug, Serialize)]
struct ClassContext<'a> {
    class_name: &'a str,
    folder_name: &'a str,
    dimensions: String,
    component_list: String,
    base_path: &'a str,
    scale: String,
    components: Vec<ComponentContext<'a>>,
}

/// Renders cabinet classes from the embedded template
pub struct ClassGenerator {
    registry: Handlebars<'static>,
}

impl ClassGenerator {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry
            .register_template_string(CLASS_TEMPLATE_NAME, CLASS_TEMPLATE)
            .context("Invalid cabinet class template")?;
        Ok(Self { registry })
    }

    /// Generate the class source for one cabinet folder
    pub fn render(
        &self,
        class_name: &str,
        folder_name: &str,
        components: &[Component],
        dimensions: CabinetDimensions,
        config: &GeneratorConfig,
    ) -> Result<String> {
        let context = ClassContext {
            class_name,
            folder_name,
            dimensions: dimensions.to_string(),
            component_list: components
                .iter()
                .map(|c| c.var_name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            base_path: &config.models_base_path,
            scale: config.component_scale.to_string(),
            components: components
                .iter()
                .map(|c| ComponentContext {
                    filename: &c.filename,
                    key: js_string(&c.var_name),
                    path: js_template(&format!("{}/{}", folder_name, c.filename)),
                })
                .collect(),
        };

        self.registry
            .render(CLASS_TEMPLATE_NAME, &context)
            .with_context(|| format!("Failed to render class {}", class_name))
    }
}

/// Escape `value` for use inside a single-quoted JavaScript string
pub fn js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

/// Escape `value` for use inside a JavaScript template literal
fn js_template(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '`' | '$') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Whether `name` can be used as a JavaScript class name
pub fn is_js_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn components() -> Vec<Component> {
        ["body.json", "din-rail.json"]
            .iter()
            .map(|f| Component::from_filename(f))
            .collect()
    }

    fn render() -> String {
        let dims = CabinetDimensions {
            width: 700,
            height: 500,
            depth: 250,
        };
        ClassGenerator::new()
            .unwrap()
            .render("TS_700", "TS_700", &components(), dims, &GeneratorConfig::default())
            .unwrap()
    }

    #[test]
    fn test_header_and_constructor() {
        let code = render();
        assert!(code.contains("import * as THREE from '../../libs/three.module.js';"));
        assert!(code.contains("import { FreeCADGeometryLoader } from"));
        assert!(code.contains(" * Dimensions: 700×500×250 mm"));
        assert!(code.contains(" * Components: body, din_rail"));
        assert!(code.contains("export class TS_700 {"));
        assert!(code.contains("this.assembly.name = 'TS_700_Assembly';"));
        assert!(code.contains("options.basePath || './assets/models/freecad'"));
    }

    #[test]
    fn test_component_loading() {
        let code = render();
        assert!(code.contains(
            "this.components['din_rail'] = await this.loader.load(`${basePath}/TS_700/din-rail.json`);"
        ));
        assert!(code.contains("this.components['body'].name = 'body';"));
        assert!(code.contains("this.components['body'].scale.set(0.001, 0.001, 0.001);"));
        assert!(code.contains("this.assembly.add(this.components['din_rail']);"));

        // Loading happens before floor alignment
        let load = code.find("this.assembly.add(this.components['din_rail'])").unwrap();
        let align = code.find("this._alignAssemblyToFloor();").unwrap();
        assert!(load < align);
    }

    #[test]
    fn test_methods_present() {
        let code = render();
        for method in [
            "setComponentPosition(",
            "getComponentPosition(",
            "getComponentWorldPosition(",
            "setComponentVisibility(",
            "_alignAssemblyToFloor() {",
            "setAssemblyPosition(",
            "getAssemblyPosition(",
            "moveAssemblyBy(",
            "resetAssemblyPosition(",
            "getInfo(",
            "getComponents(",
            "getAssembly(",
        ] {
            assert!(code.contains(method), "missing {method}");
        }
        // JavaScript template literals pass through untouched
        assert!(code.contains("${offsetY.toFixed(3)}"));
    }

    #[test]
    fn test_no_html_escaping() {
        let code = render();
        assert!(!code.contains("&#x27;"));
        assert!(!code.contains("&lt;"));
    }

    #[test]
    fn test_dotted_and_quoted_file_names() {
        let components: Vec<Component> =
            ["DIN_RAIL_40.001.json", "PANEL.003.json", "o'hare\\x.json"]
                .iter()
                .map(|f| Component::from_filename(f))
                .collect();
        let code = ClassGenerator::new()
            .unwrap()
            .render(
                "TS_700",
                "TS_700",
                &components,
                CabinetDimensions::default(),
                &GeneratorConfig::default(),
            )
            .unwrap();

        assert!(code.contains(
            "this.components['DIN_RAIL_40.001'] = await this.loader.load(`${basePath}/TS_700/DIN_RAIL_40.001.json`);"
        ));
        assert!(code.contains("this.components['PANEL.003'].name = 'PANEL.003';"));
        assert!(!code.contains("this.components.DIN_RAIL_40.001"));
        assert!(code.contains("this.components['o\\'hare\\\\x'].position.set(0, 0, 0);"));
    }

    #[test]
    fn test_js_escaping() {
        assert_eq!(js_string("plain.001"), "plain.001");
        assert_eq!(js_string("it's"), "it\\'s");
        assert_eq!(js_string("a\\b"), "a\\\\b");
        assert_eq!(js_template("a`${b}"), "a\\`\\${b}");
    }

    #[test]
    fn test_js_identifier() {
        assert!(is_js_identifier("TS_700_500_250"));
        assert!(is_js_identifier("_Cabinet$"));
        assert!(!is_js_identifier("700_500"));
        assert!(!is_js_identifier("my-cabinet"));
        assert!(!is_js_identifier(""));
    }
}
