use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// A complete block program as assembled in the visual editor.
///
/// The editor owns construction; the compiler treats the tree as read-only
/// for the duration of a generation pass. Blocks are stored in a flat map
/// and linked by id: `next` forms statement chains, `parent` points back to
/// the previous block or to the enclosing container, and `roots` lists the
/// top-level chain heads in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub blocks: HashMap<String, Block>,
    #[serde(default)]
    pub roots: Vec<String>,
    pub metadata: ProgramMetadata,
}

/// One block instance in the tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub block_type: String,
    #[serde(default)]
    pub fields: HashMap<String, FieldValue>,
    /// Value socket name -> connected child block id. A missing entry is an
    /// unconnected socket.
    #[serde(default)]
    pub inputs: HashMap<String, String>,
    /// Statement socket name -> head block id of the nested chain.
    #[serde(default)]
    pub bodies: HashMap<String, String>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramMetadata {
    pub name: String,
    pub description: String,
    pub version: String,
    pub created_at: String,
    pub modified_at: String,
}

/// A literal field value set through the block's own UI (text input,
/// dropdown, checkbox).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Flag(bool),
}

impl Program {
    pub fn new(name: &str) -> Self {
        Self {
            blocks: HashMap::new(),
            roots: Vec::new(),
            metadata: ProgramMetadata {
                name: name.to_string(),
                description: String::new(),
                version: "1.0.0".to_string(),
                created_at: chrono::Utc::now().to_rfc3339(),
                modified_at: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    pub fn add_block(&mut self, block: Block) {
        self.blocks.insert(block.id.clone(), block);
        self.touch();
    }

    /// Add a block and register it as a top-level chain head.
    pub fn add_root(&mut self, block: Block) {
        let id = block.id.clone();
        self.add_block(block);
        self.roots.push(id);
    }

    /// Link `next_id` as the statement following `prev_id`, maintaining the
    /// back-link.
    pub fn connect_next(&mut self, prev_id: &str, next_id: &str) {
        if let Some(prev) = self.blocks.get_mut(prev_id) {
            prev.next = Some(next_id.to_string());
        }
        if let Some(next) = self.blocks.get_mut(next_id) {
            next.parent = Some(prev_id.to_string());
        }
        self.touch();
    }

    /// Plug `child_id` into a value socket of `parent_id`.
    pub fn connect_input(&mut self, parent_id: &str, socket: &str, child_id: &str) {
        if let Some(parent) = self.blocks.get_mut(parent_id) {
            parent.inputs.insert(socket.to_string(), child_id.to_string());
        }
        if let Some(child) = self.blocks.get_mut(child_id) {
            child.parent = Some(parent_id.to_string());
        }
        self.touch();
    }

    /// Nest the chain starting at `head_id` inside a statement socket of
    /// `parent_id`.
    pub fn connect_body(&mut self, parent_id: &str, socket: &str, head_id: &str) {
        if let Some(parent) = self.blocks.get_mut(parent_id) {
            parent.bodies.insert(socket.to_string(), head_id.to_string());
        }
        if let Some(head) = self.blocks.get_mut(head_id) {
            head.parent = Some(parent_id.to_string());
        }
        self.touch();
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.get(id)
    }

    /// Whether the tree contains at least one enabled block of the given
    /// type tag. This is the precondition scan: side-effect free and safe to
    /// re-run once per emission call.
    pub fn contains_enabled(&self, block_type: &str) -> bool {
        self.blocks
            .values()
            .any(|b| !b.disabled && b.block_type == block_type)
    }

    /// All enabled blocks of the given type tag, in no particular order.
    pub fn enabled_blocks_of_type<'a>(
        &'a self,
        block_type: &'a str,
    ) -> impl Iterator<Item = &'a Block> + 'a {
        self.blocks
            .values()
            .filter(move |b| !b.disabled && b.block_type == block_type)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    fn touch(&mut self) {
        self.metadata.modified_at = chrono::Utc::now().to_rfc3339();
    }
}

impl Block {
    pub fn new(id: &str, block_type: &str) -> Self {
        Self {
            id: id.to_string(),
            block_type: block_type.to_string(),
            fields: HashMap::new(),
            inputs: HashMap::new(),
            bodies: HashMap::new(),
            next: None,
            parent: None,
            disabled: false,
        }
    }

    pub fn set_field(&mut self, name: &str, value: FieldValue) {
        self.fields.insert(name.to_string(), value);
    }

    /// Text field accessor. Dropdown and text-input fields arrive as
    /// `FieldValue::Text`.
    pub fn field_text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn field_number(&self, name: &str) -> Option<f64> {
        match self.fields.get(name) {
            Some(FieldValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn field_flag(&self, name: &str) -> Option<bool> {
        match self.fields.get(name) {
            Some(FieldValue::Flag(b)) => Some(*b),
            _ => None,
        }
    }

    /// Child block id connected to a value socket, if any.
    pub fn input(&self, socket: &str) -> Option<&str> {
        self.inputs.get(socket).map(String::as_str)
    }

    /// Head block id of a statement socket's nested chain, if any.
    pub fn body(&self, socket: &str) -> Option<&str> {
        self.bodies.get(socket).map(String::as_str)
    }
}
