use std::fmt::Display;

/// The static type lattice. `Comparable` and `Any` are supertype
/// placeholders; no runtime value ever has them as its concrete type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Nil,
    Boolean,
    Integer,
    Decimal,
    Character,
    String,
    Comparable,
    Any,
}

impl Type {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "Nil" => Type::Nil,
            "Boolean" => Type::Boolean,
            "Integer" => Type::Integer,
            "Decimal" => Type::Decimal,
            "Character" => Type::Character,
            "String" => Type::String,
            "Comparable" => Type::Comparable,
            "Any" => Type::Any,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Type::Nil => "Nil",
            Type::Boolean => "Boolean",
            Type::Integer => "Integer",
            Type::Decimal => "Decimal",
            Type::Character => "Character",
            Type::String => "String",
            Type::Comparable => "Comparable",
            Type::Any => "Any",
        }
    }

    pub fn is_comparable(&self) -> bool {
        matches!(self, Type::Integer | Type::Decimal | Type::Character | Type::String)
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A variable binding as resolved by the analyzer and written into the
/// annotation slot of the node that declared or referenced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub value_type: Type,
    pub mutable: bool,
}

/// A function binding as resolved by the analyzer. `jvm_name` is the
/// callable name rendered by the Java backend; it differs from `name`
/// only for builtins.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub name: String,
    pub jvm_name: String,
    pub parameter_types: Vec<Type>,
    pub return_type: Type,
}
