//! The execution engine — statement dispatch over a line table.
//!
//! A single `run_frame` loop executes both the top-level program and every
//! method body: the engine pulls the next statement from the frame's line
//! table, tokenizes it, and dispatches on the first token. Handlers mutate
//! the variable store, the loop stack, or the next-line pointer; when a
//! handler leaves the pointer alone, the engine advances to the smallest
//! line number greater than the current one. Statement errors are reported
//! with the offending line number and execution continues sequentially —
//! one bad statement never aborts the program.

use std::collections::HashMap;
use std::io::{self, Write};

use crate::error::{BasicDiagnostic, BasicError, BasicResult};
use crate::expr::{evaluate, evaluate_condition};
use crate::frame::{DataQueue, Frame, LoopFrame};
use crate::lexer::{split_outside_quotes, tokenize};
use crate::object::{ClassDef, MethodDef, ObjectInstance};
use crate::program::LineTable;
use crate::value::{strip_quotes, Value};

/// A method definition in progress. While this is live, every incoming
/// statement is captured verbatim instead of executed, until END METHOD.
struct MethodCapture {
    class: String,
    name: String,
    params: Vec<String>,
    body: Vec<String>,
}

/// Interpreter state that outlives any single frame: class and object
/// registries, the shared data queue, and the method-capture context.
pub struct Interpreter {
    classes: HashMap<String, ClassDef>,
    objects: HashMap<String, ObjectInstance>,
    next_object_id: usize,
    data: DataQueue,
    capture: Option<MethodCapture>,
    current_class: Option<String>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            classes: HashMap::new(),
            objects: HashMap::new(),
            next_object_id: 0,
            data: DataQueue::new(),
            capture: None,
            current_class: None,
        }
    }

    /// Run a whole program in a fresh frame and hand the frame back.
    pub fn run(&mut self, lines: LineTable) -> Frame {
        let mut frame = Frame::new(lines);
        self.run_frame(&mut frame);
        frame
    }

    /// Run one frame to completion: END, or no next line.
    ///
    /// The advance rule: after dispatch, if the handler did not move the
    /// next-line pointer itself (no GOTO or loop branch), step to the
    /// smallest line number strictly greater than the current one. A
    /// current line absent from the table is skipped, not an error.
    pub fn run_frame(&mut self, frame: &mut Frame) {
        while !frame.halted {
            let Some(line) = frame.next else { break };
            frame.current = line;
            let Some(statement) = frame.lines.get(line).map(str::to_string) else {
                frame.next = frame.lines.next_after(line);
                continue;
            };
            if let Err(e) = self.execute(frame, &statement) {
                eprintln!("{}", e.at_line(line));
            }
            if frame.next == Some(line) {
                frame.next = frame.lines.next_after(line);
            }
        }
    }

    /// Tokenize and dispatch one statement against a frame.
    pub fn execute(&mut self, frame: &mut Frame, statement: &str) -> BasicResult<()> {
        if self.capture.is_some() {
            return self.capture_statement(statement);
        }
        let tokens = tokenize(statement);
        let Some(first) = tokens.first() else {
            return Ok(());
        };
        let keyword = first.to_uppercase();
        let rest = statement_rest(statement);
        match keyword.as_str() {
            "PRINT" => exec_print(frame, rest),
            "LET" => exec_let(frame, &tokens),
            "GOTO" => exec_goto(frame, rest),
            "IF" => self.exec_if(frame, &tokens),
            "FOR" => exec_for(frame, &tokens),
            "NEXT" => exec_next(frame, &tokens),
            "INPUT" => exec_input(frame, &tokens),
            "READ" => self.exec_read(frame, rest),
            "DATA" => {
                for piece in split_outside_quotes(rest, ',') {
                    if !piece.is_empty() {
                        self.data.push(piece);
                    }
                }
                Ok(())
            }
            "RESTORE" => {
                self.data.restore();
                Ok(())
            }
            "END" => {
                if tokens.get(1).is_some_and(|t| t.eq_ignore_ascii_case("METHOD")) {
                    return Err(BasicDiagnostic::new(BasicError::MethodOutsideClass)
                        .with_detail("END METHOD outside a method definition"));
                }
                frame.halted = true;
                Ok(())
            }
            "REM" => Ok(()),
            "CLASS" => self.exec_class(&tokens),
            "METHOD" => self.exec_method(rest),
            "ENDCLASS" => {
                // no-op outside a definition context
                self.current_class = None;
                Ok(())
            }
            "NEW" => self.exec_new(frame, &tokens),
            "CALL" => self.exec_call(frame, rest),
            _ => {
                if let Some(eq) = find_unquoted(statement, '=') {
                    let var = statement[..eq].trim();
                    if var.is_empty() {
                        return Err(BasicDiagnostic::new(BasicError::BadSyntax)
                            .with_detail("assignment requires a variable name"));
                    }
                    let value = evaluate(&statement[eq + 1..], &frame.vars);
                    frame.vars.insert(var.to_string(), value);
                    Ok(())
                } else {
                    Err(BasicDiagnostic::new(BasicError::UnknownStatement)
                        .with_detail(format!("'{first}'")))
                }
            }
        }
    }

    // ── Method capture ───────────────────────────────────────────────

    fn capture_statement(&mut self, statement: &str) -> BasicResult<()> {
        let trimmed = statement.trim();
        if trimmed.to_uppercase().starts_with("END METHOD") {
            let Some(capture) = self.capture.take() else {
                return Ok(());
            };
            // Bodies are numbered once, here; calls re-bind this table.
            let body = LineTable::from_statements(&capture.body);
            let class = self.classes.entry(capture.class).or_default();
            class.methods.insert(
                capture.name,
                MethodDef {
                    params: capture.params,
                    body,
                },
            );
        } else if let Some(capture) = self.capture.as_mut() {
            capture.body.push(trimmed.to_string());
        }
        Ok(())
    }

    // ── Statement handlers ───────────────────────────────────────────

    /// IF <condition> THEN <clause>: a bare integer clause branches, any
    /// other clause is executed in place in the same frame.
    fn exec_if(&mut self, frame: &mut Frame, tokens: &[String]) -> BasicResult<()> {
        let then_pos = tokens
            .iter()
            .position(|t| t.eq_ignore_ascii_case("THEN"))
            .ok_or_else(|| {
                BasicDiagnostic::new(BasicError::BadSyntax).with_detail("IF without THEN")
            })?;
        let condition = tokens[1..then_pos].join(" ");
        let clause = tokens[then_pos + 1..].join(" ");
        if clause.is_empty() {
            return Err(BasicDiagnostic::new(BasicError::BadSyntax)
                .with_detail("THEN requires a statement or line number"));
        }
        if evaluate_condition(&condition, &frame.vars)? {
            if let Ok(target) = clause.parse::<u32>() {
                frame.next = Some(target);
            } else {
                self.execute(frame, &clause)?;
            }
        }
        Ok(())
    }

    fn exec_read(&mut self, frame: &mut Frame, rest: &str) -> BasicResult<()> {
        let names: Vec<String> = split_outside_quotes(rest, ',')
            .into_iter()
            .filter(|n| !n.is_empty())
            .collect();
        if names.is_empty() {
            return Err(BasicDiagnostic::new(BasicError::BadSyntax)
                .with_detail("READ requires at least one variable"));
        }
        for name in names {
            let token = self
                .data
                .read()
                .ok_or_else(|| {
                    BasicDiagnostic::new(BasicError::DataExhausted)
                        .with_detail(format!("READ {name}"))
                })?
                .to_string();
            frame.vars.insert(name, Value::from_literal(&token));
        }
        Ok(())
    }

    fn exec_class(&mut self, tokens: &[String]) -> BasicResult<()> {
        let name = tokens.get(1).ok_or_else(|| {
            BasicDiagnostic::new(BasicError::BadSyntax).with_detail("CLASS requires a name")
        })?;
        self.current_class = Some(name.clone());
        self.classes.insert(name.clone(), ClassDef::default());
        Ok(())
    }

    /// METHOD <name>(<params>): enters capture mode until END METHOD.
    fn exec_method(&mut self, rest: &str) -> BasicResult<()> {
        let class = self
            .current_class
            .clone()
            .ok_or_else(|| BasicDiagnostic::new(BasicError::MethodOutsideClass))?;
        let (name, params) = parse_callable(rest)?;
        if name.is_empty() {
            return Err(BasicDiagnostic::new(BasicError::BadSyntax)
                .with_detail("METHOD requires a name"));
        }
        self.capture = Some(MethodCapture {
            class,
            name,
            params,
            body: Vec::new(),
        });
        Ok(())
    }

    /// NEW <var> = <Class>(<args>): allocates an object and runs `init`
    /// when the class defines one.
    fn exec_new(&mut self, frame: &mut Frame, tokens: &[String]) -> BasicResult<()> {
        if tokens.len() < 4 || tokens[2] != "=" {
            return Err(BasicDiagnostic::new(BasicError::BadSyntax)
                .with_detail("NEW expects <var> = <Class>(<args>)"));
        }
        let var = tokens[1].clone();
        let (class_name, raw_args) = parse_callable(&tokens[3..].join(" "))?;
        if !self.classes.contains_key(&class_name) {
            return Err(BasicDiagnostic::new(BasicError::UndefinedClass)
                .with_detail(format!("class {class_name} is not defined")));
        }
        let id = format!("obj_{}", self.next_object_id);
        self.next_object_id += 1;
        self.objects
            .insert(id.clone(), ObjectInstance::new(&class_name));
        frame.vars.insert(var, Value::Text(id.clone()));
        let has_init = self.classes[&class_name].methods.contains_key("init");
        if has_init {
            self.call_method(frame, &id, "init", &raw_args)?;
        }
        Ok(())
    }

    /// CALL <object>.<method>(<args>)
    fn exec_call(&mut self, frame: &mut Frame, rest: &str) -> BasicResult<()> {
        let dot = find_unquoted(rest, '.').ok_or_else(|| {
            BasicDiagnostic::new(BasicError::BadSyntax)
                .with_detail("CALL expects <object>.<method>(<args>)")
        })?;
        let obj_name = rest[..dot].trim();
        let (method_name, raw_args) = parse_callable(&rest[dot + 1..])?;
        if method_name.is_empty() {
            return Err(BasicDiagnostic::new(BasicError::BadSyntax)
                .with_detail("CALL expects <object>.<method>(<args>)"));
        }
        let Some(value) = frame.vars.get(obj_name) else {
            return Err(BasicDiagnostic::new(BasicError::UndefinedObject)
                .with_detail(format!("object {obj_name} not found")));
        };
        let Value::Text(id) = value else {
            return Err(BasicDiagnostic::new(BasicError::UndefinedObject)
                .with_detail(format!("{obj_name} is not an object")));
        };
        let id = id.clone();
        self.call_method(frame, &id, &method_name, &raw_args)
    }

    // ── Method invocation protocol ───────────────────────────────────

    /// Invoke a method on an object.
    ///
    /// Arguments are evaluated in the caller's variable context, then a
    /// fresh child frame runs the captured body over its own variable
    /// store: `this`, the object's properties, and the parameters bound
    /// positionally (unfilled parameters simply stay unbound). The
    /// caller's frame is a separate value and is never touched, so a
    /// failure anywhere in the call cannot corrupt it.
    ///
    /// After the body completes, property sync: keys already present in
    /// the property store take their current value from the child store.
    /// `init` is the exception that establishes the store — every child
    /// binding except `this` and the declared parameters becomes a
    /// property.
    pub fn call_method(
        &mut self,
        caller: &mut Frame,
        obj_id: &str,
        method_name: &str,
        raw_args: &[String],
    ) -> BasicResult<()> {
        let object = self.objects.get(obj_id).ok_or_else(|| {
            BasicDiagnostic::new(BasicError::UndefinedObject)
                .with_detail(format!("object {obj_id} not found"))
        })?;
        let class_name = object.class.clone();
        let properties = object.properties.clone();
        let class = self.classes.get(&class_name).ok_or_else(|| {
            BasicDiagnostic::new(BasicError::UndefinedClass)
                .with_detail(format!("class {class_name} is not defined"))
        })?;
        let method = class.methods.get(method_name).ok_or_else(|| {
            BasicDiagnostic::new(BasicError::UndefinedMethod)
                .with_detail(format!("method {method_name} not found in class {class_name}"))
        })?;
        let params = method.params.clone();
        let body = method.body.clone();

        let args: Vec<Value> = raw_args.iter().map(|a| evaluate(a, &caller.vars)).collect();
        let mut vars = HashMap::new();
        vars.insert("this".to_string(), Value::Text(obj_id.to_string()));
        vars.extend(properties);
        for (param, arg) in params.iter().zip(args) {
            vars.insert(param.clone(), arg);
        }

        let mut child = Frame::with_vars(body, vars);
        self.run_frame(&mut child);

        if let Some(object) = self.objects.get_mut(obj_id) {
            if method_name == "init" {
                for (key, value) in &child.vars {
                    if key != "this" && !params.contains(key) {
                        object.properties.insert(key.clone(), value.clone());
                    }
                }
            } else {
                let keys: Vec<String> = object.properties.keys().cloned().collect();
                for key in keys {
                    if let Some(value) = child.vars.get(&key) {
                        object.properties.insert(key, value.clone());
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

// ── Frame-only handlers ──────────────────────────────────────────────

/// PRINT: items split at top-level `,` and `;`. A `,` renders as a tab,
/// `;` as nothing. Inside an item, a single token is evaluated directly;
/// a multi-token item is tried as one arithmetic expression first, then
/// falls back to per-token evaluation joined with spaces.
fn exec_print(frame: &mut Frame, rest: &str) -> BasicResult<()> {
    let mut out = String::new();
    let mut item = String::new();
    let mut in_quotes = false;
    for c in rest.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                item.push(c);
            }
            ',' | ';' if !in_quotes => {
                out.push_str(&render_print_item(frame, &item));
                if c == ',' {
                    out.push('\t');
                }
                item.clear();
            }
            _ => item.push(c),
        }
    }
    out.push_str(&render_print_item(frame, &item));
    println!("{out}");
    Ok(())
}

fn exec_let(frame: &mut Frame, tokens: &[String]) -> BasicResult<()> {
    if tokens.len() < 3 || tokens[2] != "=" {
        return Err(BasicDiagnostic::new(BasicError::BadSyntax)
            .with_detail("LET expects <var> = <expr>"));
    }
    let value = evaluate(&tokens[3..].join(" "), &frame.vars);
    frame.vars.insert(tokens[1].clone(), value);
    Ok(())
}

fn exec_goto(frame: &mut Frame, rest: &str) -> BasicResult<()> {
    let value = evaluate(rest, &frame.vars);
    let target = value
        .as_number()
        .filter(|n| n.fract() == 0.0 && *n >= 0.0)
        .ok_or_else(|| {
            BasicDiagnostic::new(BasicError::ExpectedNumber)
                .with_detail(format!("GOTO target '{rest}'"))
        })? as u32;
    if !frame.lines.contains(target) {
        return Err(BasicDiagnostic::new(BasicError::UnknownLine)
            .with_detail(format!("line {target} does not exist")));
    }
    frame.next = Some(target);
    Ok(())
}

/// FOR <var> = <start> TO <end> [STEP <step>]: assigns start immediately
/// and pushes a loop frame whose resume line is the line after the FOR.
fn exec_for(frame: &mut Frame, tokens: &[String]) -> BasicResult<()> {
    let syntax = || {
        BasicDiagnostic::new(BasicError::BadSyntax)
            .with_detail("FOR expects <var> = <start> TO <end> [STEP <step>]")
    };
    if tokens.len() < 4 || tokens[2] != "=" {
        return Err(syntax());
    }
    let to_pos = tokens
        .iter()
        .position(|t| t.eq_ignore_ascii_case("TO"))
        .filter(|&p| p > 3)
        .ok_or_else(syntax)?;
    let step_pos = tokens.iter().position(|t| t.eq_ignore_ascii_case("STEP"));
    let end_stop = step_pos.unwrap_or(tokens.len());
    if end_stop <= to_pos + 1 {
        return Err(syntax());
    }
    let var = tokens[1].clone();
    let start = eval_number(frame, &tokens[3..to_pos].join(" "), "FOR start")?;
    let end = eval_number(frame, &tokens[to_pos + 1..end_stop].join(" "), "FOR end")?;
    let step = match step_pos {
        Some(p) if p + 1 < tokens.len() => {
            eval_number(frame, &tokens[p + 1..].join(" "), "FOR step")?
        }
        Some(_) => return Err(syntax()),
        None => 1.0,
    };
    frame.vars.insert(var.clone(), Value::Number(start));
    frame.loops.push(LoopFrame {
        var,
        end,
        step,
        resume_line: frame.lines.next_after(frame.current),
    });
    Ok(())
}

/// NEXT [<var>]: increments the innermost loop variable and branches back
/// while the continuation condition holds; otherwise pops the frame.
fn exec_next(frame: &mut Frame, tokens: &[String]) -> BasicResult<()> {
    let Some(top) = frame.loops.last() else {
        return Err(BasicDiagnostic::new(BasicError::NextWithoutFor));
    };
    if let Some(name) = tokens.get(1) {
        if *name != top.var {
            return Err(BasicDiagnostic::new(BasicError::LoopMismatch)
                .with_detail(format!("expected {}, got {name}", top.var)));
        }
    }
    let (var, end, step, resume_line) = (top.var.clone(), top.end, top.step, top.resume_line);
    let current = frame
        .vars
        .get(&var)
        .and_then(Value::as_number)
        .ok_or_else(|| {
            BasicDiagnostic::new(BasicError::ExpectedNumber)
                .with_detail(format!("loop variable {var}"))
        })?;
    let next_value = current + step;
    frame.vars.insert(var, Value::Number(next_value));
    let continuing = if step >= 0.0 {
        next_value <= end
    } else {
        next_value >= end
    };
    match resume_line {
        Some(line) if continuing => frame.next = Some(line),
        _ => {
            frame.loops.pop();
        }
    }
    Ok(())
}

/// INPUT [<prompt>] <var> [, <var> ...]: one value per variable from
/// standard input; blank input is reprompted with an escalated marker.
fn exec_input(frame: &mut Frame, tokens: &[String]) -> BasicResult<()> {
    let mut index = 1;
    let mut prompt: Option<&str> = None;
    if let Some(inner) = tokens.get(1).and_then(|t| strip_quotes(t)) {
        prompt = Some(inner);
        index = 2;
    }
    let names: Vec<String> = split_outside_quotes(&tokens[index..].join(" "), ',')
        .into_iter()
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        return Err(BasicDiagnostic::new(BasicError::BadSyntax)
            .with_detail("INPUT requires at least one variable"));
    }
    for name in names {
        let value = read_input_value(prompt)?;
        frame.vars.insert(name, value);
    }
    Ok(())
}

fn read_input_value(prompt: Option<&str>) -> BasicResult<Value> {
    let mut retry = false;
    loop {
        print!("{}", if retry { "?? " } else { prompt.unwrap_or("? ") });
        io::stdout().flush().map_err(|e| {
            BasicDiagnostic::new(BasicError::InputFailed).with_detail(e.to_string())
        })?;
        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                return Err(BasicDiagnostic::new(BasicError::InputFailed)
                    .with_detail("unexpected end of input"));
            }
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    retry = true;
                    continue;
                }
                return Ok(Value::from_literal(trimmed));
            }
            Err(e) => {
                return Err(
                    BasicDiagnostic::new(BasicError::InputFailed).with_detail(e.to_string())
                );
            }
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

/// The raw statement text after its first (keyword) token.
fn statement_rest(statement: &str) -> &str {
    let trimmed = statement.trim_start();
    match trimmed.find(char::is_whitespace) {
        Some(i) => trimmed[i..].trim_start(),
        None => "",
    }
}

/// First occurrence of `needle` outside quoted spans.
fn find_unquoted(text: &str, needle: char) -> Option<usize> {
    let mut in_quotes = false;
    for (i, c) in text.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == needle && !in_quotes {
            return Some(i);
        }
    }
    None
}

/// Split `name(arg1, arg2)` into the name and raw argument expressions.
/// Without parentheses the whole text is the name and there are no args.
fn parse_callable(text: &str) -> BasicResult<(String, Vec<String>)> {
    let text = text.trim();
    let Some(open) = text.find('(') else {
        return Ok((text.to_string(), Vec::new()));
    };
    let close = text.rfind(')').filter(|&c| c > open).ok_or_else(|| {
        BasicDiagnostic::new(BasicError::BadSyntax).with_detail("unbalanced parentheses")
    })?;
    let name = text[..open].trim().to_string();
    let inner = &text[open + 1..close];
    let args = if inner.trim().is_empty() {
        Vec::new()
    } else {
        split_outside_quotes(inner, ',')
    };
    Ok((name, args))
}

fn eval_number(frame: &Frame, expr: &str, what: &str) -> BasicResult<f64> {
    evaluate(expr, &frame.vars).as_number().ok_or_else(|| {
        BasicDiagnostic::new(BasicError::ExpectedNumber)
            .with_detail(format!("{what} must be a number, got '{expr}'"))
    })
}

fn render_print_item(frame: &Frame, item: &str) -> String {
    let trimmed = item.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let tokens = tokenize(trimmed);
    if tokens.len() == 1 {
        return evaluate(trimmed, &frame.vars).to_string();
    }
    // a multi-token item may be one arithmetic expression ("2 + 3")
    if let whole @ Value::Number(_) = evaluate(trimmed, &frame.vars) {
        return whole.to_string();
    }
    tokens
        .iter()
        .map(|t| evaluate(t, &frame.vars).to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
