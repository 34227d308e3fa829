//! Operators of the AS2 tree.
//!
//! Each operator displays as its surface syntax.

use strum::Display;

use crate::action::Action;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum BinaryOperator {
    /// AS1 `add`, string concatenation with numeric coercion
    #[strum(serialize = "add")]
    LegacyAdd,
    /// `+`
    #[strum(serialize = "+")]
    Add,
    /// `&`
    #[strum(serialize = "&")]
    BitwiseAnd,
    /// `<<`
    #[strum(serialize = "<<")]
    LeftShift,
    /// `|`
    #[strum(serialize = "|")]
    BitwiseOr,
    /// `>>`
    #[strum(serialize = ">>")]
    SignedRightShift,
    /// `>>>`
    #[strum(serialize = ">>>")]
    UnsignedRightShift,
    /// `^`
    #[strum(serialize = "^")]
    BitwiseXor,
    /// `/`
    #[strum(serialize = "/")]
    Divide,
    /// `==`
    #[strum(serialize = "==")]
    Equals,
    /// `>`
    #[strum(serialize = ">")]
    Greater,
    /// `instanceof`
    #[strum(serialize = "instanceof")]
    InstanceOf,
    /// `<`
    #[strum(serialize = "<")]
    Less,
    /// `%`
    #[strum(serialize = "%")]
    Remainder,
    /// `*`
    #[strum(serialize = "*")]
    Multiply,
    /// `===`
    #[strum(serialize = "===")]
    StrictEquals,
    /// `-`
    #[strum(serialize = "-")]
    Subtract,
}

impl BinaryOperator {
    /// Maps a binary operator action to its tree operator.
    ///
    /// Returns `None` for actions that are not binary operators.
    #[must_use]
    pub const fn from_action(action: &Action) -> Option<Self> {
        let operator = match action {
            Action::Add => BinaryOperator::LegacyAdd,
            Action::Add2 => BinaryOperator::Add,
            Action::BitAnd => BinaryOperator::BitwiseAnd,
            Action::BitLShift => BinaryOperator::LeftShift,
            Action::BitOr => BinaryOperator::BitwiseOr,
            Action::BitRShift => BinaryOperator::SignedRightShift,
            Action::BitURShift => BinaryOperator::UnsignedRightShift,
            Action::BitXor => BinaryOperator::BitwiseXor,
            Action::Divide => BinaryOperator::Divide,
            Action::Equals2 => BinaryOperator::Equals,
            Action::Greater => BinaryOperator::Greater,
            Action::InstanceOf => BinaryOperator::InstanceOf,
            Action::Less2 => BinaryOperator::Less,
            Action::Modulo => BinaryOperator::Remainder,
            Action::Multiply => BinaryOperator::Multiply,
            Action::StrictEquals => BinaryOperator::StrictEquals,
            Action::Subtract => BinaryOperator::Subtract,
            _ => return None,
        };
        Some(operator)
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum UnaryOperator {
    /// `!`
    #[strum(serialize = "!")]
    LogicalNot,
    /// `typeof`
    #[strum(serialize = "typeof")]
    TypeOf,
}

/// Short-circuiting operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum LogicalOperator {
    /// `&&`
    #[strum(serialize = "&&")]
    And,
    /// `||`
    #[strum(serialize = "||")]
    Or,
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum AssignmentOperator {
    /// `=`
    #[strum(serialize = "=")]
    Simple,
    /// `+=`
    #[strum(serialize = "+=")]
    Add,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_operator_mapping() {
        assert_eq!(
            BinaryOperator::from_action(&Action::Add),
            Some(BinaryOperator::LegacyAdd)
        );
        assert_eq!(
            BinaryOperator::from_action(&Action::Add2),
            Some(BinaryOperator::Add)
        );
        assert_eq!(
            BinaryOperator::from_action(&Action::Modulo),
            Some(BinaryOperator::Remainder)
        );
        assert_eq!(BinaryOperator::from_action(&Action::Not), None);
    }

    #[test]
    fn test_mapping_agrees_with_action_classification() {
        let actions = [
            Action::Add,
            Action::BitURShift,
            Action::Less2,
            Action::Trace,
            Action::Pop,
            Action::StrictEquals,
        ];
        for action in &actions {
            assert_eq!(
                BinaryOperator::from_action(action).is_some(),
                action.is_binary_operator(),
                "{}",
                action.kind()
            );
        }
    }

    #[test]
    fn test_display_symbols() {
        assert_eq!(BinaryOperator::UnsignedRightShift.to_string(), ">>>");
        assert_eq!(BinaryOperator::LegacyAdd.to_string(), "add");
        assert_eq!(UnaryOperator::TypeOf.to_string(), "typeof");
        assert_eq!(LogicalOperator::Or.to_string(), "||");
        assert_eq!(AssignmentOperator::Add.to_string(), "+=");
    }
}
