//! Nom-based parser for TypeScript declaration sources.
//!
//! Covers the declaration subset found in generated `.d.ts` files: exported type
//! aliases and interfaces, unions/intersections, tuples, object types, arrays,
//! literals, keywords and (generic) references. Comments are skipped.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while, take_while_m_n},
    character::complete::{char, digit1, multispace1, none_of, one_of, satisfy},
    combinator::{all_consuming, cut, map, map_opt, not, opt, recognize, value},
    error::{context, ContextError, ParseError as NomParseError},
    multi::{many0, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use crate::ir::{Declaration, Literal, Member, MemberKey, Module, TsType, TupleElem};

// ============================================================================
// Public API
// ============================================================================

/// Parse a complete declaration source into a [`Module`].
///
/// Returns a human-readable error message on invalid syntax.
pub fn parse_module(input: &str) -> Result<Module, String> {
    match all_consuming(module::<nom::error::VerboseError<&str>>)(input) {
        Ok((_, module)) => Ok(module),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(nom::error::convert_error(input, e))
        }
        Err(nom::Err::Incomplete(_)) => Err("Incomplete input".to_string()),
    }
}

/// Parse a single type expression.
pub fn parse_type(input: &str) -> Result<TsType, String> {
    match all_consuming(terminated(ts_type::<nom::error::VerboseError<&str>>, ws))(input) {
        Ok((_, ty)) => Ok(ty),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(nom::error::convert_error(input, e))
        }
        Err(nom::Err::Incomplete(_)) => Err("Incomplete input".to_string()),
    }
}

// ============================================================================
// Trivia & Tokens
// ============================================================================

fn ws<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, (), E> {
    value((), many0(alt((multispace1, line_comment, block_comment))))(input)
}

fn line_comment<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, &'a str, E> {
    recognize(pair(tag("//"), take_while(|c| c != '\n')))(input)
}

fn block_comment<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, &'a str, E> {
    recognize(tuple((tag("/*"), take_until("*/"), tag("*/"))))(input)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn sym<'a, E: NomParseError<&'a str>>(
    s: &'static str,
) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str, E> {
    move |input| preceded(ws, tag(s))(input)
}

/// A reserved word not directly followed by another identifier character.
fn keyword<'a, E: NomParseError<&'a str>>(
    kw: &'static str,
) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str, E> {
    move |input| preceded(ws, terminated(tag(kw), not(satisfy(is_ident_char))))(input)
}

fn identifier<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, &'a str, E> {
    preceded(ws, recognize(pair(satisfy(is_ident_start), take_while(is_ident_char))))(input)
}

// ============================================================================
// Declarations
// ============================================================================

fn module<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, Module, E> {
    let (input, declarations) = many0(declaration)(input)?;
    let (input, _) = ws(input)?;
    Ok((input, Module { declarations }))
}

fn declaration<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, Declaration, E> {
    let (input, _) = opt(keyword("export"))(input)?;
    let (input, _) = opt(keyword("declare"))(input)?;
    let (input, decl) = alt((type_alias, interface))(input)?;
    let (input, _) = opt(sym(";"))(input)?;
    Ok((input, decl))
}

fn type_alias<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, Declaration, E> {
    let (input, _) = keyword("type")(input)?;
    let (input, name) = cut(context("type name", identifier))(input)?;
    let (input, _) = opt(type_params)(input)?;
    let (input, _) = cut(context("`=`", sym("=")))(input)?;
    let (input, ty) = cut(context("type", ts_type))(input)?;
    Ok((
        input,
        Declaration::TypeAlias { name: name.to_string(), ty, comment: None },
    ))
}

fn interface<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, Declaration, E> {
    let (input, _) = keyword("interface")(input)?;
    let (input, name) = cut(context("interface name", identifier))(input)?;
    let (input, _) = opt(type_params)(input)?;
    let (input, extends) = opt(preceded(
        keyword("extends"),
        cut(separated_list1(sym(","), postfix_type)),
    ))(input)?;
    let (input, members) = cut(context("interface body", object_body))(input)?;
    Ok((
        input,
        Declaration::Interface {
            name: name.to_string(),
            extends: extends.unwrap_or_default(),
            members,
            comment: None,
        },
    ))
}

/// `<T, U extends X = Y>`; parameters are validated but not kept.
fn type_params<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, (), E> {
    let param = tuple((
        identifier,
        opt(preceded(keyword("extends"), ts_type)),
        opt(preceded(sym("="), ts_type)),
    ));
    value(
        (),
        preceded(sym("<"), cut(terminated(separated_list1(sym(","), param), sym(">")))),
    )(input)
}

// ============================================================================
// Types
// ============================================================================

fn ts_type<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, TsType, E> {
    let (input, _) = opt(sym("|"))(input)?;
    let (input, first) = intersection_type(input)?;
    let (input, rest) = many0(preceded(sym("|"), cut(intersection_type)))(input)?;
    if rest.is_empty() {
        return Ok((input, first));
    }
    // nested (parenthesized) unions stay nested
    let mut members = vec![first];
    members.extend(rest);
    Ok((input, TsType::Union(members)))
}

fn intersection_type<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, TsType, E> {
    let (input, _) = opt(sym("&"))(input)?;
    let (input, first) = postfix_type(input)?;
    let (input, rest) = many0(preceded(sym("&"), cut(postfix_type)))(input)?;
    if rest.is_empty() {
        return Ok((input, first));
    }
    let mut members = vec![first];
    members.extend(rest);
    Ok((input, TsType::Intersection(members)))
}

fn postfix_type<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, TsType, E> {
    let (input, mut ty) = primary_type(input)?;
    let (input, dims) = many0(pair(sym("["), sym("]")))(input)?;
    for _ in dims {
        ty = TsType::Array(Box::new(ty));
    }
    Ok((input, ty))
}

fn primary_type<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, TsType, E> {
    context(
        "type",
        alt((
            delimited(sym("("), cut(ts_type), cut(context("`)`", sym(")")))),
            tuple_type,
            map(object_body, TsType::TypeLiteral),
            map(string_literal, |s| TsType::Literal(Literal::String(s))),
            map(number_literal, |n| TsType::Literal(Literal::Number(n.to_string()))),
            named_type,
        )),
    )(input)
}

fn tuple_type<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, TsType, E> {
    let (input, _) = sym("[")(input)?;
    let (input, elems) = separated_list0(sym(","), tuple_elem)(input)?;
    let (input, _) = opt(sym(","))(input)?;
    let (input, _) = cut(context("`]`", sym("]")))(input)?;
    Ok((input, TsType::Tuple(elems)))
}

fn tuple_elem<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, TupleElem, E> {
    let (input, rest) = opt(sym("..."))(input)?;
    let (input, ty) = ts_type(input)?;
    let (input, optional) = opt(sym("?"))(input)?;
    Ok((
        input,
        TupleElem { ty, optional: optional.is_some(), rest: rest.is_some() },
    ))
}

fn object_body<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, Vec<Member>, E> {
    let (input, _) = sym("{")(input)?;
    let (input, members) = many0(terminated(member, opt(alt((sym(";"), sym(","))))))(input)?;
    let (input, _) = cut(context("`}`", sym("}")))(input)?;
    Ok((input, members))
}

fn member<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, Member, E> {
    // `readonly?: T` names a property called readonly
    let (input, readonly) =
        opt(terminated(keyword("readonly"), not(alt((sym("?"), sym(":"))))))(input)?;
    let (input, key) = alt((
        index_key,
        map(identifier, |name| MemberKey::Name(name.to_string())),
        map(string_literal, MemberKey::Name),
        map(number_literal, |n| MemberKey::Name(n.to_string())),
    ))(input)?;
    let (input, optional) = opt(sym("?"))(input)?;
    let (input, _) = cut(context("`:`", sym(":")))(input)?;
    let (input, ty) = cut(ts_type)(input)?;
    Ok((
        input,
        Member {
            key,
            ty,
            optional: optional.is_some(),
            readonly: readonly.is_some(),
            comment: None,
        },
    ))
}

fn index_key<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, MemberKey, E> {
    let (input, _) = sym("[")(input)?;
    let (input, param) = identifier(input)?;
    let (input, _) = sym(":")(input)?;
    let (input, key_ty) = cut(ts_type)(input)?;
    let (input, _) = cut(context("`]`", sym("]")))(input)?;
    Ok((
        input,
        MemberKey::Index { param: param.to_string(), key_ty: Box::new(key_ty) },
    ))
}

fn named_type<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, TsType, E> {
    let (input, name) = preceded(
        ws,
        recognize(separated_list1(
            char('.'),
            pair(satisfy(is_ident_start), take_while(is_ident_char)),
        )),
    )(input)?;
    let keyword_type = match name {
        "any" => Some(TsType::Any),
        "unknown" => Some(TsType::Unknown),
        "never" => Some(TsType::Never),
        "null" => Some(TsType::Null),
        "undefined" => Some(TsType::Undefined),
        "boolean" => Some(TsType::Boolean),
        "number" => Some(TsType::Number),
        "string" => Some(TsType::String),
        "object" => Some(TsType::Object),
        "true" => Some(TsType::Literal(Literal::Bool(true))),
        "false" => Some(TsType::Literal(Literal::Bool(false))),
        _ => None,
    };
    if let Some(ty) = keyword_type {
        return Ok((input, ty));
    }
    let (input, args) = opt(delimited(
        sym("<"),
        cut(separated_list1(sym(","), ts_type)),
        cut(context("`>`", sym(">"))),
    ))(input)?;
    Ok((
        input,
        TsType::Reference { name: name.to_string(), args: args.unwrap_or_default() },
    ))
}

// ============================================================================
// Literals
// ============================================================================

fn string_literal<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, String, E> {
    preceded(
        ws,
        alt((
            delimited(char('\''), string_body("\\'"), cut(char('\''))),
            delimited(char('"'), string_body("\\\""), cut(char('"'))),
        )),
    )(input)
}

/// Characters up to the closing quote, with escapes resolved. `stop` holds the
/// backslash and the quote character.
fn string_body<'a, E: NomParseError<&'a str>>(
    stop: &'static str,
) -> impl FnMut(&'a str) -> IResult<&'a str, String, E> {
    move |input| {
        let escape = alt((
            value('\\', char('\\')),
            value('\'', char('\'')),
            value('"', char('"')),
            value('/', char('/')),
            value('\n', char('n')),
            value('\r', char('r')),
            value('\t', char('t')),
            value('\u{8}', char('b')),
            value('\u{c}', char('f')),
            preceded(
                char('u'),
                map_opt(take_while_m_n(4, 4, |c: char| c.is_ascii_hexdigit()), |hex| {
                    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
                }),
            ),
        ));
        map(
            opt(nom::bytes::complete::escaped_transform(none_of(stop), '\\', escape)),
            Option::unwrap_or_default,
        )(input)
    }
}

fn number_literal<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, &'a str, E> {
    preceded(
        ws,
        recognize(tuple((
            opt(char('-')),
            digit1,
            opt(pair(char('.'), digit1)),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
    )(input)
}
