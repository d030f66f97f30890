use std::fmt::{Display, Formatter};

/// Parsed pattern. Each node exclusively owns its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ast {
    /// Matches only the empty string; produced for an empty pattern when
    /// [`EmptyPattern::MatchEmpty`](crate::EmptyPattern::MatchEmpty) is set.
    Empty,
    Literal(char),
    Concat(Box<Ast>, Box<Ast>),
    Alternation(Box<Ast>, Box<Ast>),
    Star(Box<Ast>),
    Plus(Box<Ast>),
}

impl Ast {
    pub fn concat(left: Ast, right: Ast) -> Self {
        Ast::Concat(Box::new(left), Box::new(right))
    }

    pub fn alternation(left: Ast, right: Ast) -> Self {
        Ast::Alternation(Box::new(left), Box::new(right))
    }

    pub fn star(child: Ast) -> Self {
        Ast::Star(Box::new(child))
    }

    pub fn plus(child: Ast) -> Self {
        Ast::Plus(Box::new(child))
    }

    /// Direct children, left to right.
    pub fn children(&self) -> Vec<&Ast> {
        match self {
            Ast::Empty | Ast::Literal(_) => vec![],
            Ast::Concat(l, r) | Ast::Alternation(l, r) => vec![l, r],
            Ast::Star(c) | Ast::Plus(c) => vec![c],
        }
    }
}

/// Moves the non-leaf children of `node` into `out`, leaving `Empty` behind.
fn detach_children(node: &mut Ast, out: &mut Vec<Ast>) {
    let mut detach = |child: &mut Box<Ast>| {
        if !matches!(**child, Ast::Empty | Ast::Literal(_)) {
            out.push(std::mem::replace(&mut **child, Ast::Empty));
        }
    };
    match node {
        Ast::Empty | Ast::Literal(_) => {}
        Ast::Concat(l, r) | Ast::Alternation(l, r) => {
            detach(l);
            detach(r);
        }
        Ast::Star(c) | Ast::Plus(c) => detach(c),
    }
}

// Left-deep chains such as `abc...` would otherwise drop one frame per node.
impl Drop for Ast {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_children(self, &mut pending);
        while let Some(mut node) = pending.pop() {
            detach_children(&mut node, &mut pending);
        }
    }
}

impl Display for Ast {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Ast::Empty => write!(f, "ε"),
            Ast::Literal(c) => write!(f, "{c}"),
            Ast::Concat(l, r) => write!(f, "Concat({l}, {r})"),
            Ast::Alternation(l, r) => write!(f, "Alternation({l}, {r})"),
            Ast::Star(c) => write!(f, "Star({c})"),
            Ast::Plus(c) => write!(f, "Plus({c})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_nests_operators() {
        let ast = Ast::alternation(
            Ast::Literal('a'),
            Ast::concat(
                Ast::plus(Ast::concat(Ast::Literal('b'), Ast::Literal('c'))),
                Ast::Literal('d'),
            ),
        );
        assert_eq!(ast.to_string(), "Alternation(a, Concat(Plus(Concat(b, c)), d))");
    }

    #[test]
    fn children_are_ordered() {
        let ast = Ast::concat(Ast::Literal('x'), Ast::star(Ast::Literal('y')));
        let children = ast.children();
        assert_eq!(children[0], &Ast::Literal('x'));
        assert_eq!(children[1], &Ast::star(Ast::Literal('y')));
        assert!(Ast::Empty.children().is_empty());
    }

    #[test]
    fn long_chains_drop_without_recursion() {
        let concat = (0..300_000).fold(Ast::Literal('a'), |acc, _| Ast::concat(acc, Ast::Literal('a')));
        drop(concat);

        let alternation = crate::to_regex(&("a|".repeat(100_000) + "a")).unwrap();
        assert!(matches!(alternation, Ast::Alternation(..)));
        drop(alternation);

        let stars = (0..300_000).fold(Ast::Literal('a'), |acc, _| Ast::star(acc));
        drop(stars);
    }
}
