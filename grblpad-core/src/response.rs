use winnow::{
    ascii::{dec_uint, space0},
    combinator::{alt, delimited, peek, preceded, rest},
    prelude::*,
    token::take_till,
};

/// Kinds of line GRBL sends back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response<'a> {
    /// `<...>` status report, to be parsed with [`crate::parse_status`]
    Status(&'a str),
    Ok,
    /// Line rejected with the given error code, still frees its buffer space
    Error(u32),
    Alarm(u32),
    /// Startup banner, sent after every firmware reset
    Welcome(&'a str),
    /// Bracketed feedback message such as `[MSG:Caution: Unlocked]`
    Message(&'a str),
    Other(&'a str),
}

fn status_response<'a>(input: &mut &'a str) -> PResult<Response<'a>> {
    preceded(peek('<'), rest)
        .map(Response::Status)
        .parse_next(input)
}

fn ok_response<'a>(input: &mut &'a str) -> PResult<Response<'a>> {
    "ok".value(Response::Ok).parse_next(input)
}

fn error_response<'a>(input: &mut &'a str) -> PResult<Response<'a>> {
    preceded(("error:", space0), dec_uint)
        .map(Response::Error)
        .parse_next(input)
}

fn alarm_response<'a>(input: &mut &'a str) -> PResult<Response<'a>> {
    preceded(("ALARM:", space0), dec_uint)
        .map(Response::Alarm)
        .parse_next(input)
}

fn welcome_response<'a>(input: &mut &'a str) -> PResult<Response<'a>> {
    preceded("Grbl ", take_till(1.., ' '))
        .map(Response::Welcome)
        .parse_next(input)
}

fn message_response<'a>(input: &mut &'a str) -> PResult<Response<'a>> {
    delimited('[', take_till(0.., ']'), ']')
        .map(Response::Message)
        .parse_next(input)
}

/// Sort a received line into one of the [`Response`] kinds.
///
/// Only the start of the line is looked at, trailing text is ignored.
pub fn response<'a>(line: &'a str) -> Response<'a> {
    let mut input = line;
    alt((
        status_response,
        ok_response,
        error_response,
        alarm_response,
        welcome_response,
        message_response,
    ))
    .parse_next(&mut input)
    .unwrap_or(Response::Other(line))
}
