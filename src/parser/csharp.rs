//! The C# grammar: rule handles and their bodies.
//!
//! [`RuleKind`] enumerates every rule up front (the handles of the
//! two-phase construction); [`grammar`] assigns the bodies and validates the
//! graph. Ordered choices deliberately put the more specific alternative
//! first — reordering alternatives changes the accepted language.
//!
//! Deliberately out of scope, surfacing as recognition errors on affected
//! files: LINQ query syntax, lambda expressions, operator/indexer/destructor
//! declarations, explicit interface implementations, `unsafe` regions, and
//! nested generic type arguments closed by a `>>` lexeme.

use super::grammar::{
    choice, kind, not, one_or_more, opt, rule, seq, word, zero_or_more, Expr, Grammar,
    GrammarBuilder, GrammarError,
};
use super::token::TokenKind;

macro_rules! rule_kinds {
    ($($name:ident),* $(,)?) => {
        /// Handles for every grammar rule. All handles exist before any rule
        /// body is assigned.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u16)]
        pub enum RuleKind { $($name),* }

        /// Number of rule handles; sizes the grammar arena and the walker
        /// dispatch table.
        pub const RULE_COUNT: usize = RuleKind::ALL.len();

        impl RuleKind {
            pub const ALL: &'static [RuleKind] = &[$(RuleKind::$name),*];

            pub fn index(self) -> usize {
                self as usize
            }

            pub fn from_index(index: usize) -> RuleKind {
                Self::ALL[index]
            }
        }
    };
}

rule_kinds![
    // compilation structure
    CompilationUnit,
    UsingDirective,
    QualifiedIdentifier,
    NamespaceDeclaration,
    NamespaceBody,
    // type declarations
    TypeDeclaration,
    ClassDeclaration,
    StructDeclaration,
    InterfaceDeclaration,
    EnumDeclaration,
    DelegateDeclaration,
    // attributes and modifiers
    AttributeSection,
    Attribute,
    AttributeArguments,
    Modifier,
    // generics
    TypeParameterList,
    TypeParameterConstraint,
    ConstraintItem,
    BaseList,
    // class members
    ClassBody,
    ClassMemberDeclaration,
    ConstructorDeclaration,
    ConstructorInitializer,
    MethodDeclaration,
    MethodBody,
    ParameterList,
    Parameter,
    PropertyDeclaration,
    AccessorList,
    AccessorDeclaration,
    EventFieldDeclaration,
    FieldDeclaration,
    VariableDeclarator,
    EnumBody,
    EnumMemberDeclaration,
    // types
    Type,
    NonArrayType,
    PredefinedType,
    TypeName,
    TypeArgumentList,
    RankSpecifier,
    // statements
    Block,
    Statement,
    LabeledStatement,
    DeclarationStatement,
    EmbeddedStatement,
    EmptyStatement,
    ExpressionStatement,
    IfStatement,
    SwitchStatement,
    SwitchSection,
    SwitchLabel,
    WhileStatement,
    DoStatement,
    ForStatement,
    ForInitializer,
    ForIterator,
    ForeachStatement,
    BreakStatement,
    ContinueStatement,
    GotoStatement,
    ReturnStatement,
    ThrowStatement,
    TryStatement,
    CatchClause,
    FinallyClause,
    UsingStatement,
    LockStatement,
    YieldStatement,
    // expressions
    Expression,
    AssignmentExpression,
    AssignmentOperator,
    ConditionalExpression,
    NullCoalescingExpression,
    ConditionalOrExpression,
    ConditionalAndExpression,
    InclusiveOrExpression,
    ExclusiveOrExpression,
    AndExpression,
    EqualityExpression,
    RelationalExpression,
    ShiftExpression,
    AdditiveExpression,
    MultiplicativeExpression,
    UnaryExpression,
    CastExpression,
    PostfixExpression,
    MemberAccess,
    Invocation,
    ElementAccess,
    ArgumentList,
    Argument,
    PrimaryExpression,
    ObjectCreationExpression,
    ArrayInitializer,
    ParenthesizedExpression,
    Literal,
];

use RuleKind::*;

fn attrs() -> Expr {
    zero_or_more(rule(AttributeSection))
}

fn mods() -> Expr {
    zero_or_more(rule(Modifier))
}

/// Builds and validates the full C# grammar.
pub fn grammar() -> Result<Grammar, GrammarError> {
    let mut g = GrammarBuilder::new();

    // ----- compilation structure -----

    g.define(
        CompilationUnit,
        seq(vec![
            zero_or_more(rule(UsingDirective)),
            zero_or_more(choice(vec![rule(NamespaceDeclaration), rule(TypeDeclaration)])),
        ]),
    );

    // plain `using A.B;`, alias `using X = A.B;`, and `using static A.B;`
    g.define(
        UsingDirective,
        seq(vec![
            word("using"),
            choice(vec![
                seq(vec![kind(TokenKind::Identifier), word("="), rule(QualifiedIdentifier)]),
                seq(vec![opt(word("static")), rule(QualifiedIdentifier)]),
            ]),
            word(";"),
        ]),
    );

    g.define(
        QualifiedIdentifier,
        seq(vec![
            kind(TokenKind::Identifier),
            zero_or_more(seq(vec![word("."), kind(TokenKind::Identifier)])),
        ]),
    );

    g.define(
        NamespaceDeclaration,
        seq(vec![word("namespace"), rule(QualifiedIdentifier), rule(NamespaceBody)]),
    );

    g.define(
        NamespaceBody,
        seq(vec![
            word("{"),
            zero_or_more(rule(UsingDirective)),
            zero_or_more(choice(vec![rule(NamespaceDeclaration), rule(TypeDeclaration)])),
            word("}"),
            opt(word(";")),
        ]),
    );

    // ----- type declarations -----

    g.define(
        TypeDeclaration,
        choice(vec![
            rule(ClassDeclaration),
            rule(StructDeclaration),
            rule(InterfaceDeclaration),
            rule(EnumDeclaration),
            rule(DelegateDeclaration),
        ]),
    );

    g.define(
        ClassDeclaration,
        seq(vec![
            attrs(),
            mods(),
            word("class"),
            kind(TokenKind::Identifier),
            opt(rule(TypeParameterList)),
            opt(rule(BaseList)),
            zero_or_more(rule(TypeParameterConstraint)),
            rule(ClassBody),
            opt(word(";")),
        ]),
    );

    g.define(
        StructDeclaration,
        seq(vec![
            attrs(),
            mods(),
            word("struct"),
            kind(TokenKind::Identifier),
            opt(rule(TypeParameterList)),
            opt(rule(BaseList)),
            zero_or_more(rule(TypeParameterConstraint)),
            rule(ClassBody),
            opt(word(";")),
        ]),
    );

    g.define(
        InterfaceDeclaration,
        seq(vec![
            attrs(),
            mods(),
            word("interface"),
            kind(TokenKind::Identifier),
            opt(rule(TypeParameterList)),
            opt(rule(BaseList)),
            zero_or_more(rule(TypeParameterConstraint)),
            rule(ClassBody),
            opt(word(";")),
        ]),
    );

    g.define(
        EnumDeclaration,
        seq(vec![
            attrs(),
            mods(),
            word("enum"),
            kind(TokenKind::Identifier),
            opt(seq(vec![word(":"), rule(Type)])),
            rule(EnumBody),
            opt(word(";")),
        ]),
    );

    g.define(
        DelegateDeclaration,
        seq(vec![
            attrs(),
            mods(),
            word("delegate"),
            rule(Type),
            kind(TokenKind::Identifier),
            opt(rule(TypeParameterList)),
            word("("),
            opt(rule(ParameterList)),
            word(")"),
            word(";"),
        ]),
    );

    // ----- attributes and modifiers -----

    g.define(
        AttributeSection,
        seq(vec![
            word("["),
            rule(Attribute),
            zero_or_more(seq(vec![word(","), rule(Attribute)])),
            word("]"),
        ]),
    );

    g.define(
        Attribute,
        seq(vec![rule(QualifiedIdentifier), opt(rule(AttributeArguments))]),
    );

    g.define(
        AttributeArguments,
        seq(vec![
            word("("),
            opt(seq(vec![
                rule(Expression),
                zero_or_more(seq(vec![word(","), rule(Expression)])),
            ])),
            word(")"),
        ]),
    );

    // `partial` and `async` lex as identifiers; `word` matches them by text.
    g.define(
        Modifier,
        choice(vec![
            word("public"),
            word("protected"),
            word("internal"),
            word("private"),
            word("static"),
            word("abstract"),
            word("sealed"),
            word("virtual"),
            word("override"),
            word("readonly"),
            word("const"),
            word("extern"),
            word("volatile"),
            word("new"),
            word("partial"),
            word("async"),
        ]),
    );

    // ----- generics -----

    g.define(
        TypeParameterList,
        seq(vec![
            word("<"),
            kind(TokenKind::Identifier),
            zero_or_more(seq(vec![word(","), kind(TokenKind::Identifier)])),
            word(">"),
        ]),
    );

    g.define(
        TypeParameterConstraint,
        seq(vec![
            word("where"),
            kind(TokenKind::Identifier),
            word(":"),
            rule(ConstraintItem),
            zero_or_more(seq(vec![word(","), rule(ConstraintItem)])),
        ]),
    );

    g.define(
        ConstraintItem,
        choice(vec![
            seq(vec![word("new"), word("("), word(")")]),
            word("class"),
            word("struct"),
            rule(Type),
        ]),
    );

    g.define(
        BaseList,
        seq(vec![
            word(":"),
            rule(Type),
            zero_or_more(seq(vec![word(","), rule(Type)])),
        ]),
    );

    // ----- class members -----

    g.define(
        ClassBody,
        seq(vec![word("{"), zero_or_more(rule(ClassMemberDeclaration)), word("}")]),
    );

    // nested types first (distinct keywords), then the paren-guarded
    // constructor, then members discriminated by what follows the name
    g.define(
        ClassMemberDeclaration,
        choice(vec![
            rule(TypeDeclaration),
            rule(ConstructorDeclaration),
            rule(MethodDeclaration),
            rule(PropertyDeclaration),
            rule(EventFieldDeclaration),
            rule(FieldDeclaration),
        ]),
    );

    g.define(
        ConstructorDeclaration,
        seq(vec![
            attrs(),
            mods(),
            kind(TokenKind::Identifier),
            word("("),
            opt(rule(ParameterList)),
            word(")"),
            opt(rule(ConstructorInitializer)),
            rule(Block),
        ]),
    );

    g.define(
        ConstructorInitializer,
        seq(vec![
            word(":"),
            choice(vec![word("base"), word("this")]),
            word("("),
            opt(rule(ArgumentList)),
            word(")"),
        ]),
    );

    g.define(
        MethodDeclaration,
        seq(vec![
            attrs(),
            mods(),
            rule(Type),
            kind(TokenKind::Identifier),
            opt(rule(TypeParameterList)),
            word("("),
            opt(rule(ParameterList)),
            word(")"),
            zero_or_more(rule(TypeParameterConstraint)),
            rule(MethodBody),
        ]),
    );

    // abstract/interface methods end with `;`
    g.define(MethodBody, choice(vec![rule(Block), word(";")]));

    g.define(
        ParameterList,
        seq(vec![rule(Parameter), zero_or_more(seq(vec![word(","), rule(Parameter)]))]),
    );

    g.define(
        Parameter,
        seq(vec![
            attrs(),
            opt(choice(vec![
                word("ref"),
                word("out"),
                word("in"),
                word("params"),
                word("this"),
            ])),
            rule(Type),
            kind(TokenKind::Identifier),
            opt(seq(vec![word("="), rule(Expression)])),
        ]),
    );

    g.define(
        PropertyDeclaration,
        seq(vec![attrs(), mods(), rule(Type), kind(TokenKind::Identifier), rule(AccessorList)]),
    );

    g.define(
        AccessorList,
        seq(vec![word("{"), one_or_more(rule(AccessorDeclaration)), word("}")]),
    );

    // get/set/add/remove lex as identifiers
    g.define(
        AccessorDeclaration,
        seq(vec![
            attrs(),
            mods(),
            choice(vec![word("get"), word("set"), word("add"), word("remove")]),
            choice(vec![rule(Block), word(";")]),
        ]),
    );

    g.define(
        EventFieldDeclaration,
        seq(vec![
            attrs(),
            mods(),
            word("event"),
            rule(Type),
            rule(VariableDeclarator),
            zero_or_more(seq(vec![word(","), rule(VariableDeclarator)])),
            word(";"),
        ]),
    );

    g.define(
        FieldDeclaration,
        seq(vec![
            attrs(),
            mods(),
            rule(Type),
            rule(VariableDeclarator),
            zero_or_more(seq(vec![word(","), rule(VariableDeclarator)])),
            word(";"),
        ]),
    );

    g.define(
        VariableDeclarator,
        seq(vec![
            kind(TokenKind::Identifier),
            opt(seq(vec![
                word("="),
                choice(vec![rule(ArrayInitializer), rule(Expression)]),
            ])),
        ]),
    );

    g.define(
        EnumBody,
        seq(vec![
            word("{"),
            opt(seq(vec![
                rule(EnumMemberDeclaration),
                zero_or_more(seq(vec![word(","), rule(EnumMemberDeclaration)])),
                opt(word(",")),
            ])),
            word("}"),
        ]),
    );

    g.define(
        EnumMemberDeclaration,
        seq(vec![
            attrs(),
            kind(TokenKind::Identifier),
            opt(seq(vec![word("="), rule(Expression)])),
        ]),
    );

    // ----- types -----

    g.define(Type, seq(vec![rule(NonArrayType), zero_or_more(rule(RankSpecifier))]));

    g.define(
        NonArrayType,
        seq(vec![
            choice(vec![rule(PredefinedType), rule(TypeName)]),
            opt(word("?")),
        ]),
    );

    g.define(
        PredefinedType,
        choice(vec![
            word("bool"),
            word("byte"),
            word("char"),
            word("decimal"),
            word("double"),
            word("float"),
            word("int"),
            word("long"),
            word("object"),
            word("sbyte"),
            word("short"),
            word("string"),
            word("uint"),
            word("ulong"),
            word("ushort"),
            word("void"),
        ]),
    );

    g.define(
        TypeName,
        seq(vec![
            kind(TokenKind::Identifier),
            opt(rule(TypeArgumentList)),
            zero_or_more(seq(vec![
                word("."),
                kind(TokenKind::Identifier),
                opt(rule(TypeArgumentList)),
            ])),
        ]),
    );

    g.define(
        TypeArgumentList,
        seq(vec![
            word("<"),
            rule(Type),
            zero_or_more(seq(vec![word(","), rule(Type)])),
            word(">"),
        ]),
    );

    g.define(
        RankSpecifier,
        seq(vec![word("["), zero_or_more(word(",")), word("]")]),
    );

    // ----- statements -----

    g.define(Block, seq(vec![word("{"), zero_or_more(rule(Statement)), word("}")]));

    g.define(
        Statement,
        choice(vec![
            rule(LabeledStatement),
            rule(DeclarationStatement),
            rule(EmbeddedStatement),
        ]),
    );

    g.define(
        LabeledStatement,
        seq(vec![kind(TokenKind::Identifier), word(":"), rule(Statement)]),
    );

    g.define(
        DeclarationStatement,
        seq(vec![
            opt(word("const")),
            rule(Type),
            rule(VariableDeclarator),
            zero_or_more(seq(vec![word(","), rule(VariableDeclarator)])),
            word(";"),
        ]),
    );

    g.define(
        EmbeddedStatement,
        choice(vec![
            rule(Block),
            rule(EmptyStatement),
            rule(IfStatement),
            rule(SwitchStatement),
            rule(WhileStatement),
            rule(DoStatement),
            rule(ForStatement),
            rule(ForeachStatement),
            rule(BreakStatement),
            rule(ContinueStatement),
            rule(GotoStatement),
            rule(ReturnStatement),
            rule(ThrowStatement),
            rule(TryStatement),
            rule(UsingStatement),
            rule(LockStatement),
            rule(YieldStatement),
            rule(ExpressionStatement),
        ]),
    );

    g.define(EmptyStatement, word(";"));

    g.define(ExpressionStatement, seq(vec![rule(Expression), word(";")]));

    // greedy `else` binds to the nearest `if`
    g.define(
        IfStatement,
        seq(vec![
            word("if"),
            word("("),
            rule(Expression),
            word(")"),
            rule(EmbeddedStatement),
            opt(seq(vec![word("else"), rule(EmbeddedStatement)])),
        ]),
    );

    g.define(
        SwitchStatement,
        seq(vec![
            word("switch"),
            word("("),
            rule(Expression),
            word(")"),
            word("{"),
            zero_or_more(rule(SwitchSection)),
            word("}"),
        ]),
    );

    g.define(
        SwitchSection,
        seq(vec![one_or_more(rule(SwitchLabel)), one_or_more(rule(Statement))]),
    );

    g.define(
        SwitchLabel,
        choice(vec![
            seq(vec![word("case"), rule(Expression), word(":")]),
            seq(vec![word("default"), word(":")]),
        ]),
    );

    g.define(
        WhileStatement,
        seq(vec![
            word("while"),
            word("("),
            rule(Expression),
            word(")"),
            rule(EmbeddedStatement),
        ]),
    );

    g.define(
        DoStatement,
        seq(vec![
            word("do"),
            rule(EmbeddedStatement),
            word("while"),
            word("("),
            rule(Expression),
            word(")"),
            word(";"),
        ]),
    );

    g.define(
        ForStatement,
        seq(vec![
            word("for"),
            word("("),
            opt(rule(ForInitializer)),
            word(";"),
            opt(rule(Expression)),
            word(";"),
            opt(rule(ForIterator)),
            word(")"),
            rule(EmbeddedStatement),
        ]),
    );

    g.define(
        ForInitializer,
        choice(vec![
            seq(vec![
                rule(Type),
                rule(VariableDeclarator),
                zero_or_more(seq(vec![word(","), rule(VariableDeclarator)])),
            ]),
            seq(vec![
                rule(Expression),
                zero_or_more(seq(vec![word(","), rule(Expression)])),
            ]),
        ]),
    );

    g.define(
        ForIterator,
        seq(vec![rule(Expression), zero_or_more(seq(vec![word(","), rule(Expression)]))]),
    );

    g.define(
        ForeachStatement,
        seq(vec![
            word("foreach"),
            word("("),
            rule(Type),
            kind(TokenKind::Identifier),
            word("in"),
            rule(Expression),
            word(")"),
            rule(EmbeddedStatement),
        ]),
    );

    g.define(BreakStatement, seq(vec![word("break"), word(";")]));

    g.define(ContinueStatement, seq(vec![word("continue"), word(";")]));

    g.define(
        GotoStatement,
        seq(vec![
            word("goto"),
            choice(vec![
                seq(vec![word("case"), rule(Expression)]),
                word("default"),
                kind(TokenKind::Identifier),
            ]),
            word(";"),
        ]),
    );

    g.define(
        ReturnStatement,
        seq(vec![word("return"), opt(rule(Expression)), word(";")]),
    );

    g.define(
        ThrowStatement,
        seq(vec![word("throw"), opt(rule(Expression)), word(";")]),
    );

    g.define(
        TryStatement,
        seq(vec![
            word("try"),
            rule(Block),
            choice(vec![
                seq(vec![one_or_more(rule(CatchClause)), opt(rule(FinallyClause))]),
                rule(FinallyClause),
            ]),
        ]),
    );

    g.define(
        CatchClause,
        seq(vec![
            word("catch"),
            opt(seq(vec![
                word("("),
                rule(Type),
                opt(kind(TokenKind::Identifier)),
                word(")"),
            ])),
            rule(Block),
        ]),
    );

    g.define(FinallyClause, seq(vec![word("finally"), rule(Block)]));

    g.define(
        UsingStatement,
        seq(vec![
            word("using"),
            word("("),
            choice(vec![
                seq(vec![rule(Type), rule(VariableDeclarator)]),
                rule(Expression),
            ]),
            word(")"),
            rule(EmbeddedStatement),
        ]),
    );

    g.define(
        LockStatement,
        seq(vec![
            word("lock"),
            word("("),
            rule(Expression),
            word(")"),
            rule(EmbeddedStatement),
        ]),
    );

    // `yield` lexes as an identifier; matched by text
    g.define(
        YieldStatement,
        seq(vec![
            word("yield"),
            choice(vec![seq(vec![word("return"), rule(Expression)]), word("break")]),
            word(";"),
        ]),
    );

    // ----- expressions, layered by precedence -----

    g.define(
        Expression,
        choice(vec![rule(AssignmentExpression), rule(ConditionalExpression)]),
    );

    g.define(
        AssignmentExpression,
        seq(vec![rule(UnaryExpression), rule(AssignmentOperator), rule(Expression)]),
    );

    g.define(
        AssignmentOperator,
        choice(vec![
            word("="),
            word("+="),
            word("-="),
            word("*="),
            word("/="),
            word("%="),
            word("&="),
            word("|="),
            word("^="),
            word("<<="),
            word(">>="),
        ]),
    );

    g.define(
        ConditionalExpression,
        seq(vec![
            rule(NullCoalescingExpression),
            opt(seq(vec![word("?"), rule(Expression), word(":"), rule(Expression)])),
        ]),
    );

    g.define(
        NullCoalescingExpression,
        seq(vec![
            rule(ConditionalOrExpression),
            zero_or_more(seq(vec![word("??"), rule(ConditionalOrExpression)])),
        ]),
    );

    g.define(
        ConditionalOrExpression,
        seq(vec![
            rule(ConditionalAndExpression),
            zero_or_more(seq(vec![word("||"), rule(ConditionalAndExpression)])),
        ]),
    );

    g.define(
        ConditionalAndExpression,
        seq(vec![
            rule(InclusiveOrExpression),
            zero_or_more(seq(vec![word("&&"), rule(InclusiveOrExpression)])),
        ]),
    );

    g.define(
        InclusiveOrExpression,
        seq(vec![
            rule(ExclusiveOrExpression),
            zero_or_more(seq(vec![word("|"), rule(ExclusiveOrExpression)])),
        ]),
    );

    g.define(
        ExclusiveOrExpression,
        seq(vec![
            rule(AndExpression),
            zero_or_more(seq(vec![word("^"), rule(AndExpression)])),
        ]),
    );

    g.define(
        AndExpression,
        seq(vec![
            rule(EqualityExpression),
            zero_or_more(seq(vec![word("&"), rule(EqualityExpression)])),
        ]),
    );

    g.define(
        EqualityExpression,
        seq(vec![
            rule(RelationalExpression),
            zero_or_more(seq(vec![
                choice(vec![word("=="), word("!=")]),
                rule(RelationalExpression),
            ])),
        ]),
    );

    g.define(
        RelationalExpression,
        seq(vec![
            rule(ShiftExpression),
            zero_or_more(choice(vec![
                seq(vec![
                    choice(vec![word("<"), word(">"), word("<="), word(">=")]),
                    rule(ShiftExpression),
                ]),
                seq(vec![choice(vec![word("is"), word("as")]), rule(Type)]),
            ])),
        ]),
    );

    g.define(
        ShiftExpression,
        seq(vec![
            rule(AdditiveExpression),
            zero_or_more(seq(vec![
                choice(vec![word("<<"), word(">>")]),
                rule(AdditiveExpression),
            ])),
        ]),
    );

    g.define(
        AdditiveExpression,
        seq(vec![
            rule(MultiplicativeExpression),
            zero_or_more(seq(vec![
                choice(vec![word("+"), word("-")]),
                rule(MultiplicativeExpression),
            ])),
        ]),
    );

    g.define(
        MultiplicativeExpression,
        seq(vec![
            rule(UnaryExpression),
            zero_or_more(seq(vec![
                choice(vec![word("*"), word("/"), word("%")]),
                rule(UnaryExpression),
            ])),
        ]),
    );

    g.define(
        UnaryExpression,
        choice(vec![
            rule(CastExpression),
            seq(vec![
                choice(vec![
                    word("+"),
                    word("-"),
                    word("!"),
                    word("~"),
                    word("++"),
                    word("--"),
                ]),
                rule(UnaryExpression),
            ]),
            rule(PostfixExpression),
        ]),
    );

    // A predefined-type cast is unambiguous. For `(Name)x` the negative
    // lookahead rejects tokens that would make the parenthesis an ordinary
    // expression, so `(a) - b` stays a subtraction.
    g.define(
        CastExpression,
        choice(vec![
            seq(vec![
                word("("),
                rule(PredefinedType),
                opt(word("?")),
                zero_or_more(rule(RankSpecifier)),
                word(")"),
                rule(UnaryExpression),
            ]),
            seq(vec![
                word("("),
                rule(Type),
                word(")"),
                not(choice(vec![
                    word("+"),
                    word("-"),
                    word("*"),
                    word("/"),
                    word("%"),
                    word("<"),
                    word(">"),
                    word("<="),
                    word(">="),
                    word("=="),
                    word("!="),
                    word("&"),
                    word("|"),
                    word("^"),
                    word("&&"),
                    word("||"),
                    word("??"),
                    word("?"),
                    word(":"),
                    word(";"),
                    word(","),
                    word(")"),
                    word("]"),
                    word("."),
                    word("="),
                    word("is"),
                    word("as"),
                    kind(TokenKind::Eof),
                ])),
                rule(UnaryExpression),
            ]),
        ]),
    );

    g.define(
        PostfixExpression,
        seq(vec![
            rule(PrimaryExpression),
            zero_or_more(choice(vec![
                rule(MemberAccess),
                rule(Invocation),
                rule(ElementAccess),
                word("++"),
                word("--"),
            ])),
        ]),
    );

    g.define(
        MemberAccess,
        seq(vec![
            word("."),
            kind(TokenKind::Identifier),
            opt(rule(TypeArgumentList)),
        ]),
    );

    g.define(
        Invocation,
        seq(vec![word("("), opt(rule(ArgumentList)), word(")")]),
    );

    g.define(
        ElementAccess,
        seq(vec![
            word("["),
            rule(Expression),
            zero_or_more(seq(vec![word(","), rule(Expression)])),
            word("]"),
        ]),
    );

    g.define(
        ArgumentList,
        seq(vec![rule(Argument), zero_or_more(seq(vec![word(","), rule(Argument)]))]),
    );

    g.define(
        Argument,
        seq(vec![opt(choice(vec![word("ref"), word("out")])), rule(Expression)]),
    );

    g.define(
        PrimaryExpression,
        choice(vec![
            rule(Literal),
            rule(ParenthesizedExpression),
            rule(ObjectCreationExpression),
            seq(vec![word("typeof"), word("("), rule(Type), word(")")]),
            seq(vec![word("default"), word("("), rule(Type), word(")")]),
            seq(vec![word("sizeof"), word("("), rule(Type), word(")")]),
            word("this"),
            word("base"),
            seq(vec![kind(TokenKind::Identifier), opt(rule(TypeArgumentList))]),
        ]),
    );

    g.define(
        ObjectCreationExpression,
        seq(vec![
            word("new"),
            rule(NonArrayType),
            choice(vec![
                seq(vec![
                    word("("),
                    opt(rule(ArgumentList)),
                    word(")"),
                    opt(rule(ArrayInitializer)),
                ]),
                seq(vec![
                    one_or_more(seq(vec![
                        word("["),
                        opt(seq(vec![
                            rule(Expression),
                            zero_or_more(seq(vec![word(","), rule(Expression)])),
                        ])),
                        word("]"),
                    ])),
                    opt(rule(ArrayInitializer)),
                ]),
                rule(ArrayInitializer),
            ]),
        ]),
    );

    // also covers object and collection initializers
    g.define(
        ArrayInitializer,
        seq(vec![
            word("{"),
            opt(seq(vec![
                choice(vec![rule(ArrayInitializer), rule(Expression)]),
                zero_or_more(seq(vec![
                    word(","),
                    choice(vec![rule(ArrayInitializer), rule(Expression)]),
                ])),
                opt(word(",")),
            ])),
            word("}"),
        ]),
    );

    g.define(
        ParenthesizedExpression,
        seq(vec![word("("), rule(Expression), word(")")]),
    );

    g.define(
        Literal,
        choice(vec![
            kind(TokenKind::IntegerLiteral),
            kind(TokenKind::HexLiteral),
            kind(TokenKind::RealLiteral),
            kind(TokenKind::CharacterLiteral),
            kind(TokenKind::StringLiteral),
            word("true"),
            word("false"),
            word("null"),
        ]),
    );

    g.build()
}
