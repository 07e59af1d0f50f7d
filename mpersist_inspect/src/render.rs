use anyhow::Result;
use mpersist_types::graph::{ErrorOrigin, NodeId, ObjectGraph, Value, TREE_DEPTH_LIMIT};
use std::collections::HashSet;
use std::fmt::Write;

const INDENT: &str = "  ";

/// Renders the graph reachable from `start` as an indented outline.
///
/// A node that can be reached more than once is labelled `#n` where it is first printed,
/// and later occurrences print `-> #n`. Cycles therefore terminate.
/// Members below [`TREE_DEPTH_LIMIT`] are elided as `...`.
pub fn render(graph: &ObjectGraph, start: NodeId) -> Result<String> {
    let in_degrees = graph.in_degrees();
    let mut rndr = Renderer {
        graph,
        start,
        in_degrees,
        seen: HashSet::new(),
        out: String::new(),
    };
    rndr.node(start, 0, "")?;
    Ok(rndr.out)
}

struct Renderer<'g> {
    graph: &'g ObjectGraph,
    start: NodeId,
    in_degrees: Vec<usize>,
    seen: HashSet<NodeId>,
    out: String,
}

impl<'g> Renderer<'g> {
    fn is_shared(&self, id: NodeId) -> bool {
        id == self.start || self.in_degrees.get(*id).map_or(false, |&deg| deg > 1)
    }

    fn line(&mut self, depth: usize, label: &str, text: &str) -> Result<()> {
        writeln!(self.out, "{}{label}{text}", INDENT.repeat(depth))?;
        Ok(())
    }

    fn node(&mut self, id: NodeId, depth: usize, label: &str) -> Result<()> {
        if depth >= TREE_DEPTH_LIMIT {
            return self.line(depth, label, "...");
        }
        if !self.seen.insert(id) {
            return self.line(depth, label, &format!("-> #{}", *id));
        }
        let marker = match self.is_shared(id) {
            true => format!("#{} ", *id),
            false => String::new(),
        };

        let graph = self.graph;
        let val = graph.value(id)?;
        let text = head(val);
        self.line(depth, label, &format!("{marker}{text}"))?;

        let depth = depth + 1;
        match val {
            Value::Tuple(members) | Value::List(members) => {
                for &m in members.iter() {
                    self.node(m, depth, "")?;
                }
            }
            Value::Dict(entries) => {
                for &(k, v) in entries.iter() {
                    self.node(k, depth, "key: ")?;
                    self.node(v, depth + 1, "")?;
                }
            }
            Value::Function(rec) => {
                self.node(rec.globals, depth, "globals: ")?;
                self.node(rec.bytecode, depth, "code: ")?;
            }
            Value::Bytecode(bc) => {
                self.node(bc.block_name, depth, "name: ")?;
                self.node(bc.source_file, depth, "file: ")?;
                for &arg in bc.arg_names.iter() {
                    self.node(arg, depth, "arg: ")?;
                }
            }
            Value::BuiltinFunction { name } => self.node(*name, depth, "name: ")?,
            _ => {}
        }
        Ok(())
    }
}

/// One line describing `val` itself, without its members.
fn head(val: &Value) -> String {
    match val {
        Value::Bytes(b) => format!("b'{}'", b.escape_ascii()),
        Value::Str(s) => format!("{s:?}"),
        Value::Int(i) => format!("{i}"),
        Value::Bool(true) => String::from("True"),
        Value::Bool(false) => String::from("False"),
        Value::Null => String::from("None"),
        Value::Special(sc) => format!("<{sc:?}>"),
        Value::Tuple(members) => format!("tuple ({})", members.len()),
        Value::List(members) => format!("list ({})", members.len()),
        Value::Dict(entries) => format!("dict ({})", entries.len()),
        Value::Error(rec) => match &rec.origin {
            ErrorOrigin::Stream => format!("error {:?}", rec.message),
            ErrorOrigin::Unresolved { name } => format!(
                "unresolved {:?}: {}",
                String::from_utf8_lossy(name),
                rec.message
            ),
        },
        Value::External(ext) => format!(
            "external {:?} = {:?}",
            String::from_utf8_lossy(&ext.name),
            ext.object
        ),
        Value::Function(rec) => format!(
            "function pos={} kwonly={} def={} flags={:#04x} extra={}",
            rec.n_pos_args, rec.n_kwonly_args, rec.n_def_args, *rec.flags, rec.extra_args
        ),
        Value::Bytecode(bc) => format!(
            "bytecode n_state={} n_exc_stack={} locals={:?} lineno_info={}B body={}B",
            bc.n_state,
            bc.n_exc_stack,
            bc.local_nums,
            bc.lineno_info.len(),
            bc.body.len()
        ),
        Value::BuiltinFunction { .. } => String::from("builtin function"),
    }
}
