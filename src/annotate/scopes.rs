//! Single-pass frame-stack builder behind [`super::annotate`].

use super::{Annotation, Conditions};
use crate::tokens::{Dialect, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    /// `(`, `[`, `{` or `#[` with no scope owner.
    Bracket,
    /// Brace body of a scope owner.
    Scope,
    /// `:` ... `endif;` style body.
    Alt,
    /// Body of a `case` or `default` label.
    Case,
    /// Body of an arrow function, opened at `=>`.
    Arrow,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    kind: FrameKind,
    opener: usize,
    owner: Option<usize>,
}

/// What a pending scope owner is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Condition,
    InCondition,
    AfterCondition,
    Opener,
    Body { parens: bool },
    Arrow { parens: bool },
    CaseBody { ternary: usize },
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    owner: usize,
    depth: usize,
    expect: Expect,
}

pub(super) struct Builder<'t> {
    tokens: &'t [Token],
    dialect: Dialect,
    ann: Vec<Annotation>,
    stack: Vec<Frame>,
    pending: Vec<Pending>,
    last_significant: Option<usize>,
}

impl<'t> Builder<'t> {
    pub(super) fn new(tokens: &'t [Token], dialect: Dialect) -> Self {
        Self {
            tokens,
            dialect,
            ann: tokens.iter().map(|t| Annotation::new(t.kind)).collect(),
            stack: Vec::new(),
            pending: Vec::new(),
            last_significant: None,
        }
    }

    pub(super) fn run(mut self) -> Vec<Annotation> {
        for i in 0..self.tokens.len() {
            self.step(i);
        }
        while let Some(frame) = self.stack.pop() {
            self.mark_unmatched(frame);
        }
        self.ann
    }

    fn step(&mut self, i: usize) {
        if self.tokens[i].kind.is_insignificant() {
            self.assign_context(i);
            return;
        }
        let kind = self.resolve_kind(i);
        self.ann[i].kind = kind;

        self.close(i, kind);
        let depth = self.stack.len();
        self.pending.retain(|p| p.depth <= depth);
        self.assign_context(i);

        if !self.advance_pending(i, kind) {
            self.open_bracket(i, kind);
        }
        self.register_owner(i, kind);
        self.last_significant = Some(i);
    }

    fn resolve_kind(&self, i: usize) -> TokenKind {
        let raw = self.tokens[i].kind;
        match raw {
            TokenKind::Function if self.is_closure(i) => TokenKind::Closure,
            TokenKind::Class if self.prev_kind() == Some(TokenKind::New) => TokenKind::AnonClass,
            TokenKind::Case if self.innermost_owner_kind() == Some(TokenKind::Enum) => {
                TokenKind::EnumCase
            }
            TokenKind::OpenSquareBracket if self.dialect != Dialect::Css && !self.prev_is_operand() => {
                TokenKind::OpenShortArray
            }
            _ => raw,
        }
    }

    fn is_closure(&self, i: usize) -> bool {
        let mut j = i;
        while let Some(next) = self.next_significant(j) {
            match self.tokens[next].kind {
                TokenKind::BitwiseOperator | TokenKind::ArithmeticOperator
                    if matches!(self.tokens[next].text.as_str(), "&" | "*") =>
                {
                    j = next;
                }
                TokenKind::OpenParenthesis => return true,
                _ => return false,
            }
        }
        false
    }

    fn prev_kind(&self) -> Option<TokenKind> {
        self.last_significant.map(|p| self.ann[p].kind)
    }

    /// Whether a `[` here indexes the previous expression.
    fn prev_is_operand(&self) -> bool {
        let Some(prev) = self.last_significant else {
            return false;
        };
        let kind = self.ann[prev].kind;
        kind.is_operand()
            || (kind == TokenKind::CloseCurlyBracket && self.ann[prev].scope_condition.is_none())
    }

    fn innermost_owner_kind(&self) -> Option<TokenKind> {
        self.stack
            .iter()
            .rev()
            .find_map(|f| f.owner)
            .map(|o| self.ann[o].kind)
    }

    fn next_significant(&self, i: usize) -> Option<usize> {
        (i + 1..self.tokens.len()).find(|&j| !self.tokens[j].kind.is_insignificant())
    }

    fn assign_context(&mut self, i: usize) {
        let conditions: Conditions = self
            .stack
            .iter()
            .filter(|f| f.kind != FrameKind::Bracket)
            .filter_map(|f| f.owner)
            .map(|o| (o, self.ann[o].kind))
            .collect();
        let parens: Vec<usize> = self
            .stack
            .iter()
            .filter(|f| {
                f.kind == FrameKind::Bracket
                    && matches!(
                        self.ann[f.opener].kind,
                        TokenKind::OpenParenthesis
                            | TokenKind::OpenSquareBracket
                            | TokenKind::OpenShortArray
                    )
            })
            .map(|f| f.opener)
            .collect();
        let ann = &mut self.ann[i];
        ann.nesting_level = conditions.len();
        ann.conditions = conditions;
        ann.parenthesis_stack = parens;
    }

    fn close(&mut self, i: usize, kind: TokenKind) {
        use TokenKind as K;
        match kind {
            K::CloseParenthesis => self.close_bracket(i, &[K::OpenParenthesis]),
            K::CloseSquareBracket => self.close_bracket(
                i,
                &[K::OpenSquareBracket, K::OpenShortArray, K::Attribute],
            ),
            K::CloseCurlyBracket => self.close_bracket(i, &[K::OpenCurlyBracket]),
            K::InterpolationClose => self.close_bracket(i, &[K::InterpolationOpen]),
            K::Endif => self.close_alt(i, &[K::If, K::Elseif, K::Else]),
            K::Endwhile => self.close_alt(i, &[K::While]),
            K::Endfor => self.close_alt(i, &[K::For]),
            K::Endforeach => self.close_alt(i, &[K::Foreach]),
            K::Endswitch => self.close_alt(i, &[K::Switch]),
            K::Enddeclare => self.close_alt(i, &[K::Declare]),
            K::Else | K::Elseif if self.dialect == Dialect::Php && self.alt_branch_follows(i) => {
                if let Some(top) = self.stack.last().copied() {
                    let owner_kind = top.owner.map(|o| self.ann[o].kind);
                    if top.kind == FrameKind::Alt && matches!(owner_kind, Some(K::If | K::Elseif)) {
                        self.stack.pop();
                        self.close_scope(top, i, false);
                    }
                }
            }
            K::Semicolon | K::Comma => {
                let mut primary = true;
                while let Some(top) = self.stack.last().copied() {
                    if top.kind != FrameKind::Arrow {
                        break;
                    }
                    self.stack.pop();
                    self.close_scope(top, i, primary);
                    primary = false;
                }
            }
            K::Case | K::Default => {
                if let Some(top) = self.stack.last().copied() {
                    if top.kind == FrameKind::Case {
                        self.stack.pop();
                        self.close_scope(top, i, false);
                    }
                }
            }
            K::Break | K::Continue | K::Return | K::Throw | K::Exit => {
                if let Some(top) = self.stack.last().copied() {
                    if top.kind == FrameKind::Case {
                        self.stack.pop();
                        self.close_scope(top, i, true);
                    }
                }
            }
            _ => {}
        }
    }

    fn close_bracket(&mut self, i: usize, openers: &[TokenKind]) {
        let found = self.stack.iter().rposition(|f| {
            matches!(f.kind, FrameKind::Bracket | FrameKind::Scope)
                && openers.contains(&self.ann[f.opener].kind)
        });
        let Some(pos) = found else {
            self.ann[i].unmatched = true;
            return;
        };
        self.unwind_to(pos, i);
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let opener = frame.opener;
        self.ann[opener].bracket_partner = Some(i);
        self.ann[i].bracket_partner = Some(opener);
        match self.ann[opener].kind {
            TokenKind::OpenShortArray => self.ann[i].kind = TokenKind::CloseShortArray,
            TokenKind::OpenParenthesis => {
                let owner = self.ann[opener].parenthesis_owner;
                for idx in [Some(opener), Some(i), owner].into_iter().flatten() {
                    let ann = &mut self.ann[idx];
                    ann.parenthesis_owner = owner;
                    ann.parenthesis_opener = Some(opener);
                    ann.parenthesis_closer = Some(i);
                }
            }
            _ => {}
        }
        if frame.kind == FrameKind::Scope {
            self.close_scope(frame, i, true);
        }
    }

    fn close_alt(&mut self, i: usize, owners: &[TokenKind]) {
        let found = self.stack.iter().rposition(|f| {
            f.kind == FrameKind::Alt && f.owner.is_some_and(|o| owners.contains(&self.ann[o].kind))
        });
        let Some(pos) = found else {
            self.ann[i].unmatched = true;
            return;
        };
        self.unwind_to(pos, i);
        if let Some(frame) = self.stack.pop() {
            self.close_scope(frame, i, true);
        }
    }

    /// Pop every frame above `pos` before `closer` closes the frame at `pos`.
    fn unwind_to(&mut self, pos: usize, closer: usize) {
        let mut arrow_closed = false;
        while self.stack.len() > pos + 1 {
            let Some(frame) = self.stack.pop() else {
                break;
            };
            match frame.kind {
                FrameKind::Arrow => {
                    // The arrow body ends with the expression, before the closer.
                    let end = self.last_significant.unwrap_or(frame.opener);
                    self.close_scope(frame, end, !arrow_closed);
                    if let Some(owner) = frame.owner {
                        let ann = &mut self.ann[end];
                        ann.conditions.remove_owner(owner);
                        ann.nesting_level = ann.conditions.len();
                    }
                    arrow_closed = true;
                }
                FrameKind::Case => self.close_scope(frame, closer, false),
                _ => self.mark_unmatched(frame),
            }
        }
    }

    fn close_scope(&mut self, frame: Frame, closer: usize, primary: bool) {
        let Some(owner) = frame.owner else {
            return;
        };
        self.ann[owner].scope_closer = Some(closer);
        self.ann[frame.opener].scope_closer = Some(closer);
        let ann = &mut self.ann[closer];
        if primary && ann.scope_condition.is_none() {
            ann.scope_condition = Some(owner);
            ann.scope_opener = Some(frame.opener);
            ann.scope_closer = Some(closer);
        }
    }

    fn mark_unmatched(&mut self, frame: Frame) {
        self.ann[frame.opener].unmatched = true;
    }

    /// `else:` or `elseif (...):`.
    fn alt_branch_follows(&self, i: usize) -> bool {
        let Some(mut j) = self.next_significant(i) else {
            return false;
        };
        if self.tokens[j].kind == TokenKind::OpenParenthesis {
            let mut depth = 0usize;
            let mut k = j;
            loop {
                match self.tokens[k].kind {
                    TokenKind::OpenParenthesis => depth += 1,
                    TokenKind::CloseParenthesis => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
                k += 1;
                if k >= self.tokens.len() {
                    return false;
                }
            }
            match self.next_significant(k) {
                Some(next) => j = next,
                None => return false,
            }
        }
        self.tokens[j].kind == TokenKind::Colon
    }

    /// Feed `kind` to the innermost pending owner at this depth. Returns
    /// true when the token was consumed as that owner's structure.
    fn advance_pending(&mut self, i: usize, kind: TokenKind) -> bool {
        use TokenKind as K;
        let depth = self.stack.len();
        let Some(pending) = self.pending.last().copied() else {
            return false;
        };
        if pending.depth != depth {
            return false;
        }
        let owner = pending.owner;
        match pending.expect {
            Expect::Condition => {
                if kind == K::OpenParenthesis {
                    self.claim_parens(owner, i);
                    self.set_expect(Expect::InCondition);
                    return true;
                }
                self.pending.pop();
                false
            }
            Expect::InCondition => {
                if kind == K::CloseParenthesis {
                    self.set_expect(Expect::AfterCondition);
                } else {
                    self.pending.pop();
                }
                false
            }
            Expect::AfterCondition | Expect::Opener => {
                self.pending.pop();
                if kind == K::OpenCurlyBracket {
                    self.open_scope(owner, i, FrameKind::Scope);
                    return true;
                }
                if kind == K::Colon && self.dialect == Dialect::Php && accepts_alt(self.ann[owner].kind) {
                    self.open_scope(owner, i, FrameKind::Alt);
                    return true;
                }
                false
            }
            Expect::Body { parens } => match kind {
                K::OpenParenthesis if !parens => {
                    self.claim_parens(owner, i);
                    self.set_expect(Expect::Body { parens: true });
                    true
                }
                K::OpenCurlyBracket => {
                    self.pending.pop();
                    self.open_scope(owner, i, FrameKind::Scope);
                    true
                }
                K::Semicolon => {
                    self.pending.pop();
                    false
                }
                _ => false,
            },
            Expect::Arrow { parens } => match kind {
                K::OpenParenthesis if !parens => {
                    self.claim_parens(owner, i);
                    self.set_expect(Expect::Arrow { parens: true });
                    true
                }
                K::DoubleArrow => {
                    self.pending.pop();
                    self.open_scope(owner, i, FrameKind::Arrow);
                    true
                }
                K::Semicolon => {
                    self.pending.pop();
                    false
                }
                _ => false,
            },
            Expect::CaseBody { ternary } => match kind {
                K::Question => {
                    self.set_expect(Expect::CaseBody {
                        ternary: ternary + 1,
                    });
                    false
                }
                K::Colon if ternary > 0 => {
                    self.set_expect(Expect::CaseBody {
                        ternary: ternary - 1,
                    });
                    false
                }
                K::Colon | K::Semicolon => {
                    self.pending.pop();
                    self.open_scope(owner, i, FrameKind::Case);
                    true
                }
                _ => false,
            },
        }
    }

    fn set_expect(&mut self, expect: Expect) {
        if let Some(top) = self.pending.last_mut() {
            top.expect = expect;
        }
    }

    fn claim_parens(&mut self, owner: usize, opener: usize) {
        self.ann[opener].parenthesis_owner = Some(owner);
        self.stack.push(Frame {
            kind: FrameKind::Bracket,
            opener,
            owner: None,
        });
    }

    fn open_scope(&mut self, owner: usize, opener: usize, kind: FrameKind) {
        for idx in [owner, opener] {
            self.ann[idx].scope_condition = Some(owner);
            self.ann[idx].scope_opener = Some(opener);
        }
        self.stack.push(Frame {
            kind,
            opener,
            owner: Some(owner),
        });
    }

    fn open_bracket(&mut self, i: usize, kind: TokenKind) {
        use TokenKind as K;
        if !matches!(
            kind,
            K::OpenParenthesis
                | K::OpenSquareBracket
                | K::OpenShortArray
                | K::OpenCurlyBracket
                | K::InterpolationOpen
                | K::Attribute
        ) {
            return;
        }
        if kind == K::OpenParenthesis {
            let owner = self.last_significant.filter(|&p| {
                matches!(
                    self.ann[p].kind,
                    K::Array | K::List | K::Isset | K::Unset | K::Empty | K::Exit | K::Use
                )
            });
            self.ann[i].parenthesis_owner = owner;
        }
        self.stack.push(Frame {
            kind: FrameKind::Bracket,
            opener: i,
            owner: None,
        });
    }

    fn register_owner(&mut self, i: usize, kind: TokenKind) {
        use TokenKind as K;
        if self.dialect == Dialect::Css {
            return;
        }
        let expect = match kind {
            K::If | K::Elseif | K::While | K::For | K::Foreach | K::Switch | K::Catch | K::Declare
            | K::Match => Expect::Condition,
            K::Else | K::Do | K::Try | K::Finally => Expect::Opener,
            K::Function
            | K::Closure
            | K::Class
            | K::AnonClass
            | K::Interface
            | K::Trait
            | K::Enum
            | K::Namespace => Expect::Body { parens: false },
            K::Fn => Expect::Arrow { parens: false },
            K::Case | K::Default if self.in_switch() => Expect::CaseBody { ternary: 0 },
            _ => return,
        };
        self.pending.push(Pending {
            owner: i,
            depth: self.stack.len(),
            expect,
        });
    }

    fn in_switch(&self) -> bool {
        self.stack.last().is_some_and(|f| {
            matches!(f.kind, FrameKind::Scope | FrameKind::Alt)
                && f.owner.is_some_and(|o| self.ann[o].kind == TokenKind::Switch)
        })
    }
}

fn accepts_alt(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::If
            | TokenKind::Elseif
            | TokenKind::Else
            | TokenKind::While
            | TokenKind::For
            | TokenKind::Foreach
            | TokenKind::Switch
            | TokenKind::Declare
    )
}

#[cfg(test)]
mod tests {
    use crate::annotate::annotate;
    use crate::tokens::{tokenize, Dialect, TokenKind};

    #[test]
    fn test_js_switch_and_function() {
        let tokens = tokenize(
            "function f(a) { switch (a) { case 1: return 2; default: break; } }",
            Dialect::Js,
        );
        let ann = annotate(&tokens, Dialect::Js);
        let func = 0;
        assert_eq!(ann[func].kind, TokenKind::Function);
        let last = tokens.len() - 1;
        assert_eq!(ann[func].scope_closer, Some(last));
        let ret = tokens.iter().position(|t| t.text == "return").unwrap();
        assert_eq!(ann[ret].scope_condition, Some(tokens.iter().position(|t| t.text == "case").unwrap()));
    }

    #[test]
    fn test_css_braces_are_plain_brackets() {
        let tokens = tokenize("a { color: red; }", Dialect::Css);
        let ann = annotate(&tokens, Dialect::Css);
        let open = tokens.iter().position(|t| t.text == "{").unwrap();
        let close = tokens.iter().position(|t| t.text == "}").unwrap();
        assert_eq!(ann[open].bracket_partner, Some(close));
        assert_eq!(ann[open].scope_condition, None);
        assert_eq!(ann[open + 2].nesting_level, 0);
    }

    #[test]
    fn test_interpolation_pairs() {
        let tokens = tokenize("<?php \"a {$b[1]} c\";", Dialect::Php);
        let ann = annotate(&tokens, Dialect::Php);
        let open = tokens
            .iter()
            .position(|t| t.kind == TokenKind::InterpolationOpen)
            .unwrap();
        let close = tokens
            .iter()
            .position(|t| t.kind == TokenKind::InterpolationClose)
            .unwrap();
        assert_eq!(ann[open].bracket_partner, Some(close));
        let idx = tokens.iter().position(|t| t.text == "[").unwrap();
        assert_eq!(ann[idx].kind, TokenKind::OpenSquareBracket);
    }

    #[test]
    fn test_annotation_is_deterministic() {
        let tokens = tokenize(
            "<?php foreach ($a as $b): ?><p><?= $b ?></p><?php endforeach; ",
            Dialect::Php,
        );
        assert_eq!(annotate(&tokens, Dialect::Php), annotate(&tokens, Dialect::Php));
        let ann = annotate(&tokens, Dialect::Php);
        let foreach = tokens.iter().position(|t| t.text == "foreach").unwrap();
        let end = tokens.iter().position(|t| t.text == "endforeach").unwrap();
        assert_eq!(ann[foreach].scope_closer, Some(end));
    }
}
