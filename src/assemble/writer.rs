//! Builder for the browser functions emitted next to the form.
//!
//! Each sync function is a flat list of statements inside one
//! `function name(param) { ... }` body, indented by two spaces per level.

const INDENT: &str = "  ";

#[derive(Debug, Default)]
pub struct ScriptWriter {
    out: String,
    depth: usize,
}

impl ScriptWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `function <name>(<param>) {`.
    pub fn function(&mut self, name: &str, param: &str) -> &mut Self {
        self.emit(&format!("function {}({}) {{", name, param));
        self.depth += 1;
        self
    }

    /// One statement; the trailing `;` is added.
    pub fn statement(&mut self, text: &str) -> &mut Self {
        self.emit(&format!("{};", text));
        self
    }

    /// `var <name>` or `var <name> = <init>`.
    pub fn declare(&mut self, name: &str, init: Option<&str>) -> &mut Self {
        match init {
            Some(init) => self.statement(&format!("var {} = {}", name, init)),
            None => self.statement(&format!("var {}", name)),
        }
    }

    /// Bind `var_name` to the first form's input called `input_name`.
    pub fn select_input(&mut self, var_name: &str, input_name: &str) -> &mut Self {
        self.statement(&format!(
            "{} = document.forms[0].elements[\"{}\"]",
            var_name, input_name
        ))
    }

    /// Close the innermost open body.
    pub fn end(&mut self) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self.emit("}");
        self
    }

    /// Generated source; any body still open is closed first.
    pub fn finish(mut self) -> String {
        while self.depth > 0 {
            self.end();
        }
        self.out
    }

    fn emit(&mut self, line: &str) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(line);
        self.out.push('\n');
    }
}
