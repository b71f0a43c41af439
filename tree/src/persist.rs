//! Line-oriented tree file format
//!
//! One record block per node, in ID order:
//!
//! ```text
//! node,<index>
//! name,<string>
//! type,<d|n|t>
//! pay,<float>                    terminal only
//! length,<count>                 decision and chance
//! descendant,<index>             `count` lines
//! prob,<float>                   chance only, `count` lines
//! ```
//!
//! Parents are not stored; they are rebuilt from the children lists once
//! the whole file has been read. Saving never overwrites an existing file.

use crate::error::PersistError;
use arbor_engine::{validate, DecisionTree, Kind, Node, NodeId};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// Shortest round-trip form, keeping a trailing `.0` on integral values.
pub(crate) fn format_float(value: f64) -> String {
    format!("{:?}", value)
}

/// Write `tree` in the text format.
pub fn write_tree<W: Write>(writer: &mut W, tree: &DecisionTree) -> Result<(), PersistError> {
    for (index, node) in tree.nodes.iter().enumerate() {
        if node.name.contains(['\n', '\r']) {
            return Err(PersistError::Unrepresentable {
                node: index as NodeId,
                reason: "name contains a line break".into(),
            });
        }
        writeln!(writer, "node,{}", index)?;
        writeln!(writer, "name,{}", node.name)?;
        writeln!(writer, "type,{}", node.kind.tag())?;
        match &node.kind {
            Kind::Terminal { payoff } => writeln!(writer, "pay,{}", format_float(*payoff))?,
            Kind::Decision { children } => write_children(writer, children)?,
            Kind::Chance {
                children,
                probabilities,
            } => {
                write_children(writer, children)?;
                for p in probabilities {
                    writeln!(writer, "prob,{}", format_float(*p))?;
                }
            }
        }
    }
    Ok(())
}

fn write_children<W: Write>(writer: &mut W, children: &[NodeId]) -> io::Result<()> {
    writeln!(writer, "length,{}", children.len())?;
    for child in children {
        writeln!(writer, "descendant,{}", child)?;
    }
    Ok(())
}

/// Fields collected for one node record
#[derive(Default)]
struct Record {
    line: usize,
    name: Option<String>,
    tag: Option<char>,
    pay: Option<f64>,
    length: Option<usize>,
    children: Vec<NodeId>,
    probabilities: Vec<f64>,
}

impl Record {
    fn into_node(self, index: usize) -> Result<Node, PersistError> {
        let line = self.line;
        let name = self
            .name
            .ok_or_else(|| PersistError::parse(line, format!("node {} has no name", index)))?;
        let tag = self
            .tag
            .ok_or_else(|| PersistError::parse(line, format!("node {} has no type", index)))?;
        let kind = match tag {
            't' => {
                if self.length.is_some() || !self.children.is_empty() || !self.probabilities.is_empty() {
                    return Err(PersistError::parse(
                        line,
                        format!("terminal {} has length, descendant or prob lines", index),
                    ));
                }
                Kind::Terminal {
                    payoff: self
                        .pay
                        .ok_or_else(|| PersistError::parse(line, format!("terminal {} has no pay", index)))?,
                }
            }
            'd' | 'n' => {
                if self.pay.is_some() {
                    return Err(PersistError::parse(line, format!("node {} has a pay line but is not terminal", index)));
                }
                let length = self
                    .length
                    .ok_or_else(|| PersistError::parse(line, format!("node {} has no length", index)))?;
                if self.children.len() != length {
                    return Err(PersistError::parse(
                        line,
                        format!("node {} declares {} descendants but lists {}", index, length, self.children.len()),
                    ));
                }
                if tag == 'd' {
                    if !self.probabilities.is_empty() {
                        return Err(PersistError::parse(line, format!("decision {} has probabilities", index)));
                    }
                    Kind::Decision {
                        children: self.children,
                    }
                } else {
                    if self.probabilities.len() != length {
                        return Err(PersistError::parse(
                            line,
                            format!("chance {} has {} probabilities for {} descendants", index, self.probabilities.len(), length),
                        ));
                    }
                    Kind::Chance {
                        children: self.children,
                        probabilities: self.probabilities,
                    }
                }
            }
            other => {
                return Err(PersistError::parse(line, format!("unknown node type '{}'", other)));
            }
        };
        Ok(Node {
            name,
            parent: None,
            kind,
        })
    }
}

fn parse_number<T: std::str::FromStr>(line: usize, key: &str, value: &str) -> Result<T, PersistError> {
    value
        .trim()
        .parse()
        .map_err(|_| PersistError::parse(line, format!("bad {} value '{}'", key, value)))
}

/// Parse a tree from the text format, rebuild parents and validate it.
pub fn read_tree<R: BufRead>(reader: R) -> Result<DecisionTree, PersistError> {
    let mut records: Vec<Record> = Vec::new();

    for (number, line) in reader.lines().enumerate() {
        let number = number + 1;
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let (key, value) = line
            .split_once(',')
            .ok_or_else(|| PersistError::parse(number, format!("expected key,value but got '{}'", line)))?;

        if key == "node" {
            let index: usize = parse_number(number, key, value)?;
            if index != records.len() {
                return Err(PersistError::parse(
                    number,
                    format!("node {} out of order, expected {}", index, records.len()),
                ));
            }
            records.push(Record {
                line: number,
                ..Record::default()
            });
            continue;
        }

        let record = records
            .last_mut()
            .ok_or_else(|| PersistError::parse(number, format!("'{}' before any node record", key)))?;
        match key {
            "name" => record.name = Some(value.to_string()),
            "type" => record.tag = value.chars().next(),
            "pay" => record.pay = Some(parse_number(number, key, value)?),
            "length" => {
                record.length = Some(parse_number(number, key, value)?);
                record.children.clear();
                record.probabilities.clear();
            }
            "descendant" => record.children.push(parse_number(number, key, value)?),
            "prob" => record.probabilities.push(parse_number(number, key, value)?),
            other => return Err(PersistError::parse(number, format!("unknown key '{}'", other))),
        }
    }

    let nodes = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.into_node(index))
        .collect::<Result<Vec<Node>, PersistError>>()?;
    let tree = DecisionTree::from_nodes(nodes);
    validate(&tree)?;
    Ok(tree)
}

/// Save `tree` to a new file at `path`; an existing file is left untouched.
pub fn save(path: impl AsRef<Path>, tree: &DecisionTree) -> Result<(), PersistError> {
    let path = path.as_ref();
    validate(tree)?;
    let mut buffer = Vec::new();
    write_tree(&mut buffer, tree)?;

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => PersistError::Conflict(path.to_path_buf()),
            _ => PersistError::Io(e),
        })?;
    file.write_all(&buffer)?;
    file.flush()?;
    log::info!("saved {} nodes to {}", tree.len(), path.display());
    Ok(())
}

/// Load and validate a tree from `path`.
pub fn load(path: impl AsRef<Path>) -> Result<DecisionTree, PersistError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => PersistError::NotFound(path.to_path_buf()),
        _ => PersistError::Io(e),
    })?;
    let tree = read_tree(BufReader::new(file))?;
    log::info!("loaded {} nodes from {}", tree.len(), path.display());
    Ok(tree)
}
