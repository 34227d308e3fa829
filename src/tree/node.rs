//! Arena slots of a [`Tree`](crate::tree::Tree).

use strum::IntoStaticStr;

use crate::{
    ast::{AssignmentOperator, BinaryOperator, Loc, LogicalOperator, UnaryOperator},
    utils::graph::NodeId,
};

/// The variant of a tree node, without its children.
///
/// Children are stored on the [`Slot`] in a fixed field order, documented per variant.
/// Optional fields come last and are simply absent when unset.
#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
pub enum NodeKind {
    /// Children: `body*`
    Script,

    /// Children: `body*`
    BlockStatement,
    /// No children
    EmptyStatement,
    /// Children: `expression`
    ExpressionStatement,
    /// Children: `test`, `truthy`, `falsy?`
    IfStatement,
    /// Children: `argument?`
    ReturnStatement,
    /// Children: `argument`
    ThrowStatement,
    /// Children: `name`, `value`
    SetVariable,
    /// No children
    OpConstantPool {
        /// Pool entries
        pool: Vec<String>,
    },
    /// Children: `name`, `value?`
    OpDeclareVariable,
    /// Children: `value`
    OpPush,
    /// Children: `value`
    OpTrace,
    /// Children: `callee`, `arg_count`, `target?`
    OpStackCall,

    /// No children
    Identifier {
        /// Identifier name
        name: String,
    },
    /// No children
    BooleanLiteral {
        /// Literal value
        value: bool,
    },
    /// No children
    NumberLiteral {
        /// Literal value
        value: f64,
    },
    /// No children
    StringLiteral {
        /// Literal value
        value: String,
    },
    /// No children
    NullLiteral,
    /// Children: `argument`
    UnaryExpression {
        /// Operator
        operator: UnaryOperator,
    },
    /// Children: `left`, `right`
    BinaryExpression {
        /// Operator
        operator: BinaryOperator,
    },
    /// Children: `left`, `right`
    LogicalExpression {
        /// Operator
        operator: LogicalOperator,
    },
    /// Children: `target`, `value`
    AssignmentExpression {
        /// Operator
        operator: AssignmentOperator,
    },
    /// Children: `base`, `key`
    MemberExpression,
    /// Children: `callee`, `arguments*`
    CallExpression,
    /// Children: `expressions*`
    SequenceExpression,
    /// Children: `test`, `truthy`, `falsy`
    ConditionalExpression,
    /// No children
    OpConstant {
        /// Pool index
        index: u16,
    },
    /// No children
    OpRegister {
        /// Register number
        register: u8,
    },
    /// No children
    OpTemporary {
        /// Temporary id
        id: u32,
    },
    /// No children
    OpGlobal,
    /// No children
    OpPop,
    /// Children: `name`
    OpVariable,
    /// Children: `index`
    OpPropertyName,
    /// No children
    OpUndefined,
    /// Children: `item_count`
    OpInitArray,
    /// Children: `item_count`
    OpInitObject,
    /// No children
    Input {
        /// Placeholder index
        index: u32,
    },

    /// No children
    IdentifierPattern {
        /// Binding name
        name: String,
    },
    /// Children: `base`, `key`
    MemberPattern,
    /// No children
    OpRegisterPattern {
        /// Register number
        register: u8,
    },
    /// No children
    OpTemporaryPattern {
        /// Temporary id
        id: u32,
    },
}

/// The syntactic category of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// The root script
    Script,
    /// A statement
    Statement,
    /// An expression
    Expression,
    /// An assignment target
    Pattern,
}

impl NodeKind {
    /// Returns the variant tag, e.g. `"OpPush"`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Returns the syntactic category of this kind.
    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            NodeKind::Script => Category::Script,
            NodeKind::BlockStatement
            | NodeKind::EmptyStatement
            | NodeKind::ExpressionStatement
            | NodeKind::IfStatement
            | NodeKind::ReturnStatement
            | NodeKind::ThrowStatement
            | NodeKind::SetVariable
            | NodeKind::OpConstantPool { .. }
            | NodeKind::OpDeclareVariable
            | NodeKind::OpPush
            | NodeKind::OpTrace
            | NodeKind::OpStackCall => Category::Statement,
            NodeKind::Identifier { .. }
            | NodeKind::BooleanLiteral { .. }
            | NodeKind::NumberLiteral { .. }
            | NodeKind::StringLiteral { .. }
            | NodeKind::NullLiteral
            | NodeKind::UnaryExpression { .. }
            | NodeKind::BinaryExpression { .. }
            | NodeKind::LogicalExpression { .. }
            | NodeKind::AssignmentExpression { .. }
            | NodeKind::MemberExpression
            | NodeKind::CallExpression
            | NodeKind::SequenceExpression
            | NodeKind::ConditionalExpression
            | NodeKind::OpConstant { .. }
            | NodeKind::OpRegister { .. }
            | NodeKind::OpTemporary { .. }
            | NodeKind::OpGlobal
            | NodeKind::OpPop
            | NodeKind::OpVariable
            | NodeKind::OpPropertyName
            | NodeKind::OpUndefined
            | NodeKind::OpInitArray
            | NodeKind::OpInitObject
            | NodeKind::Input { .. } => Category::Expression,
            NodeKind::IdentifierPattern { .. }
            | NodeKind::MemberPattern
            | NodeKind::OpRegisterPattern { .. }
            | NodeKind::OpTemporaryPattern { .. } => Category::Pattern,
        }
    }
}

/// The field of the parent a node is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    /// Statement list of a script or block
    Body,
    /// Expression of an expression statement
    Expression,
    /// Condition
    Test,
    /// Branch taken when the condition holds
    Truthy,
    /// Branch taken otherwise
    Falsy,
    /// Operand of a unary expression, return or throw
    Argument,
    /// Variable name
    Name,
    /// Assigned, pushed or printed value
    Value,
    /// Assignment or call result target
    Target,
    /// Called function
    Callee,
    /// Number of stack arguments
    ArgCount,
    /// Call argument list
    Arguments,
    /// Sequence items
    Expressions,
    /// Left operand
    Left,
    /// Right operand
    Right,
    /// Object of a member access
    Base,
    /// Key of a member access
    Key,
    /// Property index
    Index,
    /// Number of initializer items
    ItemCount,
}

/// Position of a node in its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    /// Parent node
    pub parent: NodeId,
    /// Field of the parent holding the node
    pub field: Field,
    /// Position among all children of the parent
    pub index: usize,
}

/// An occupied arena slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    /// Node variant
    pub kind: NodeKind,
    /// Source location
    pub loc: Loc,
    /// Children in field order
    pub children: Vec<NodeId>,
}
