//! Bundled tools offered to every candidate model
//!
//! All of them are fakes: nothing touches the filesystem or the network.
//! They answer with plausible payloads so a model can complete its turn.

use super::result::ToolError;
use super::tool::{Tool, ToolMetadata, ToolSchema};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde_json::{Value, json};

fn str_arg<'a>(args: &'a Value, field: &str) -> &'a str {
    args.get(field).and_then(Value::as_str).unwrap_or_default()
}

/// Fake file-save tool
pub struct FileTool {
    metadata: ToolMetadata,
}

impl FileTool {
    pub const NAME: &'static str = "fileTool";

    pub fn new() -> Self {
        Self {
            metadata: ToolMetadata::new(Self::NAME, "A tool for saving text to a file")
                .with_returns("Confirmation that the file was saved"),
        }
    }
}

impl Default for FileTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FileTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::required_strings(&["name", "path", "content"])
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let name = str_arg(&args, "name");
        let path = str_arg(&args, "path");
        Ok(json!({
            "success": true,
            "message": format!("File {} saved to {}", name, path),
            "params": args,
        }))
    }
}

/// Fake San Francisco weather lookup
pub struct WeatherInSfTool {
    metadata: ToolMetadata,
}

impl WeatherInSfTool {
    pub const NAME: &'static str = "weatherInSfTool";

    pub fn new() -> Self {
        Self {
            metadata: ToolMetadata::new(Self::NAME, "A tool for getting the weather in San Francisco")
                .with_returns("Weather report for the requested date"),
        }
    }
}

impl Default for WeatherInSfTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WeatherInSfTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::required_strings(&["date"])
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let raw = str_arg(&args, "date");
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
            ToolError::invalid_input(format!("Invalid date '{}': {}", raw, e))
        })?;

        const SKIES: [&str; 4] = ["Sunny", "Partly cloudy", "Foggy morning, clearing later", "Overcast"];
        let day = date.ordinal() as usize;
        let high = 62 + (day % 9);
        let low = 52 + (day % 5);
        let output = format!(
            "San Francisco, {}: {}. High {}°F, low {}°F. Wind W 10-15 mph.",
            date.format("%A, %B %-d, %Y"),
            SKIES[day % SKIES.len()],
            high,
            low
        );

        Ok(json!({
            "success": true,
            "date": raw,
            "output": output,
        }))
    }
}

/// Fake web search
pub struct SearchTool {
    metadata: ToolMetadata,
}

impl SearchTool {
    pub const NAME: &'static str = "searchTool";

    pub fn new() -> Self {
        Self {
            metadata: ToolMetadata::new(Self::NAME, "A tool for searching the web")
                .with_returns("A list of search results"),
        }
    }
}

impl Default for SearchTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::required_strings(&["query"])
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let query = str_arg(&args, "query");
        let results: Vec<Value> = (1..=3)
            .map(|rank| {
                json!({
                    "title": format!("{} - result {}", query, rank),
                    "url": format!("https://example.com/search/{}", rank),
                    "snippet": format!("Coverage and analysis related to \"{}\".", query),
                })
            })
            .collect();

        Ok(json!({
            "success": true,
            "query": query,
            "output": results,
        }))
    }
}

/// Arithmetic evaluator for `+ - * /` and parentheses
pub struct CalculatorTool {
    metadata: ToolMetadata,
}

impl CalculatorTool {
    pub const NAME: &'static str = "calculatorTool";

    pub fn new() -> Self {
        Self {
            metadata: ToolMetadata::new(
                Self::NAME,
                "A tool for evaluating arithmetic expressions with + - * / and parentheses",
            )
            .with_returns("The numeric result"),
        }
    }
}

impl Default for CalculatorTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for CalculatorTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::required_strings(&["expression"])
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let expression = str_arg(&args, "expression");
        let result = evaluate_expression(expression).map_err(ToolError::invalid_input)?;
        Ok(json!({
            "success": true,
            "expression": expression,
            "result": result,
        }))
    }
}

/// Evaluate an arithmetic expression.
///
/// Grammar: `expr := term (('+'|'-') term)*`, `term := factor (('*'|'/') factor)*`,
/// `factor := ('-'|'+') factor | number | '(' expr ')'`.
pub fn evaluate_expression(input: &str) -> Result<f64, String> {
    let mut parser = ExprParser {
        chars: input.chars().filter(|c| !c.is_whitespace()).collect(),
        pos: 0,
        depth: 0,
    };
    if parser.chars.is_empty() {
        return Err("Empty expression".to_string());
    }
    let value = parser.expr()?;
    if let Some(c) = parser.peek() {
        return Err(format!("Unexpected character '{}' at position {}", c, parser.pos));
    }
    Ok(value)
}

/// Maximum nesting of parentheses and unary signs
pub const MAX_EXPRESSION_DEPTH: usize = 256;

struct ExprParser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl ExprParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Consume the current character and descend one nesting level
    fn descend(&mut self) -> Result<(), String> {
        self.depth += 1;
        if self.depth > MAX_EXPRESSION_DEPTH {
            return Err("Expression nested too deeply".to_string());
        }
        self.pos += 1;
        Ok(())
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, String>) -> Result<T, String> {
        self.descend()?;
        let value = f(self);
        self.depth -= 1;
        value
    }

    fn expr(&mut self) -> Result<f64, String> {
        let mut value = self.term()?;
        while let Some(op @ ('+' | '-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, String> {
        let mut value = self.factor()?;
        while let Some(op @ ('*' | '/')) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            if op == '*' {
                value *= rhs;
            } else {
                if rhs == 0.0 {
                    return Err("Division by zero".to_string());
                }
                value /= rhs;
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, String> {
        match self.peek() {
            Some('-') => self.nested(|p| Ok(-p.factor()?)),
            Some('+') => self.nested(Self::factor),
            Some('(') => self.nested(|p| {
                let value = p.expr()?;
                if p.peek() != Some(')') {
                    return Err("Missing closing parenthesis".to_string());
                }
                p.pos += 1;
                Ok(value)
            }),
            Some(c) if c.is_ascii_digit() || c == '.' => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|c| c.is_ascii_digit() || c == '.')
                {
                    self.pos += 1;
                }
                let literal: String = self.chars[start..self.pos].iter().collect();
                literal
                    .parse::<f64>()
                    .map_err(|_| format!("Invalid number '{}'", literal))
            }
            Some(c) => Err(format!("Unexpected character '{}' at position {}", c, self.pos)),
            None => Err("Unexpected end of expression".to_string()),
        }
    }
}
