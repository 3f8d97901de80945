// Strongly-typed TypeScript IR. Shared by the printer (codegen) and the parser (ts_parse).
// No serde_json::Value here.

#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    Any,
    Unknown,
    Never,
    Null,
    Undefined,
    Boolean,
    Number,
    String,
    Object,                  // the `object` keyword, not a literal
    Literal(Literal),
    Reference {
        name: String,        // may be dotted (`A.B`)
        args: Vec<TsType>,
    },
    Array(Box<TsType>),
    Tuple(Vec<TupleElem>),
    TypeLiteral(Vec<Member>),
    Union(Vec<TsType>),      // build through `TsType::union` to keep it flat
    Intersection(Vec<TsType>),
    /// type text printed as written (`tsType` outside the parsed subset)
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(String),          // kept as written (`1`, `-2.5`)
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TupleElem {
    pub ty: TsType,
    pub optional: bool,      // `T?`
    pub rest: bool,          // `...T`
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub key: MemberKey,
    pub ty: TsType,
    pub optional: bool,
    pub readonly: bool,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberKey {
    Name(String),
    /// `[param: key_ty]`
    Index { param: String, key_ty: Box<TsType> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    TypeAlias {
        name: String,
        ty: TsType,
        comment: Option<String>,
    },
    Interface {
        name: String,
        extends: Vec<TsType>,
        members: Vec<Member>,
        comment: Option<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    pub declarations: Vec<Declaration>,
}

impl TsType {
    /// Union with nested unions spliced in. Zero members is `never`, one is the member itself.
    pub fn union(members: impl IntoIterator<Item = TsType>) -> TsType {
        let mut flat = Vec::new();
        for m in members {
            match m {
                TsType::Union(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => TsType::Never,
            1 => flat.remove(0),
            _ => TsType::Union(flat),
        }
    }

    pub fn intersection(members: impl IntoIterator<Item = TsType>) -> TsType {
        let mut flat = Vec::new();
        for m in members {
            match m {
                TsType::Intersection(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => TsType::Unknown,
            1 => flat.remove(0),
            _ => TsType::Intersection(flat),
        }
    }

    pub fn reference(name: impl Into<String>) -> TsType {
        TsType::Reference { name: name.into(), args: Vec::new() }
    }

    pub fn string_literal(value: impl Into<String>) -> TsType {
        TsType::Literal(Literal::String(value.into()))
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, TsType::Tuple(_))
    }
}

impl TupleElem {
    pub fn required(ty: TsType) -> Self {
        TupleElem { ty, optional: false, rest: false }
    }
}

impl Member {
    pub fn property(name: impl Into<String>, ty: TsType, optional: bool) -> Self {
        Member {
            key: MemberKey::Name(name.into()),
            ty,
            optional,
            readonly: false,
            comment: None,
        }
    }

    /// `[k: string]: ty`
    pub fn string_index(ty: TsType) -> Self {
        Member {
            key: MemberKey::Index { param: "k".to_string(), key_ty: Box::new(TsType::String) },
            ty,
            optional: false,
            readonly: false,
            comment: None,
        }
    }
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::TypeAlias { name, .. } | Declaration::Interface { name, .. } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_splices_nested_unions() {
        let inner = TsType::union([TsType::Null, TsType::Boolean]);
        let outer = TsType::union([TsType::String, inner]);
        assert_eq!(outer, TsType::Union(vec![TsType::String, TsType::Null, TsType::Boolean]));
    }

    #[test]
    fn single_member_union_collapses() {
        assert_eq!(TsType::union([TsType::Number]), TsType::Number);
        assert_eq!(TsType::union(Vec::new()), TsType::Never);
    }
}
