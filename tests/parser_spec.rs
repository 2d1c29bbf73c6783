/// Spec tests for the kscript parser.
///
/// Each test verifies that a specific source snippet produces the expected
/// AST structure. Tests assert the relevant parts of the AST and ignore
/// surrounding structure where possible.
use std::rc::Rc;

use kscript::ast::*;
use kscript::lexer::Lexer;
use kscript::parser::Parser;
use pretty_assertions::assert_eq;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse(src: &str) -> Vec<Stmt> {
    let mut lexer = Lexer::new(src);
    let tokens = lexer.tokenize().expect("lex failed");
    let mut parser = Parser::new(tokens);
    parser.parse().expect("parse failed")
}

fn parse_error(src: &str) -> String {
    let mut lexer = Lexer::new(src);
    let tokens = lexer.tokenize().expect("lex failed");
    let mut parser = Parser::new(tokens);
    parser
        .parse()
        .expect_err("expected parse error")
        .to_string()
}

/// The single expression statement in `src`.
fn expr(src: &str) -> Expr {
    match parse(src).into_iter().next() {
        Some(Stmt::Expression(e)) => e,
        other => panic!("expected an expression statement, got: {:?}", other),
    }
}

fn var(name: &str) -> Box<Expr> {
    Box::new(Expr::Variable(name.to_string()))
}

fn int(i: i32) -> Box<Expr> {
    Box::new(Expr::Literal(Literal::Int(i)))
}

fn scalar(base: TypeName) -> TypeRef {
    TypeRef::scalar(base)
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[test]
fn multiplication_binds_tighter() {
    assert_eq!(
        expr("1 + 2 * 3;"),
        Expr::Binary(
            BinOp::Add,
            int(1),
            Box::new(Expr::Binary(BinOp::Mul, int(2), int(3)))
        )
    );
}

#[test]
fn binary_is_left_associative() {
    assert_eq!(
        expr("8 - 4 - 2;"),
        Expr::Binary(
            BinOp::Sub,
            Box::new(Expr::Binary(BinOp::Sub, int(8), int(4))),
            int(2)
        )
    );
}

#[test]
fn logical_precedence() {
    assert_eq!(
        expr("a || b && c;"),
        Expr::Binary(
            BinOp::Or,
            var("a"),
            Box::new(Expr::Binary(BinOp::And, var("b"), var("c")))
        )
    );
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(
        expr("a = b = 1;"),
        Expr::Assign("a".to_string(), Box::new(Expr::Assign("b".to_string(), int(1))))
    );
}

#[test]
fn assignment_targets() {
    assert_eq!(
        expr("a[1, 2] = 3;"),
        Expr::ArrayAssign(var("a"), vec![*int(1), *int(2)], int(3))
    );
    assert_eq!(
        expr("p.x = 3;"),
        Expr::MemberAssign(var("p"), "x".to_string(), int(3))
    );
}

#[test]
fn invalid_assignment_target_fails() {
    assert!(parse_error("1 = 2;").contains("Invalid assignment target"));
}

#[test]
fn prefix_and_postfix_steps() {
    assert_eq!(expr("++i;"), Expr::Unary(UnaryOp::Inc, var("i")));
    assert_eq!(expr("i--;"), Expr::Postfix(StepOp::Dec, var("i")));
    assert_eq!(
        expr("a[0]++;"),
        Expr::Postfix(StepOp::Inc, Box::new(Expr::ArrayAccess(var("a"), vec![*int(0)])))
    );
}

#[test]
fn step_on_call_fails() {
    assert!(parse_error("f()++;").contains("Invalid target"));
}

#[test]
fn method_call_chain() {
    assert_eq!(
        expr("p.move(1);"),
        Expr::Call(
            Box::new(Expr::MemberAccess(var("p"), "move".to_string())),
            vec![*int(1)]
        )
    );
}

#[test]
fn new_array_and_new_instance() {
    assert_eq!(expr("new int[2, 3];"), Expr::ArrayNew(TypeName::Int, vec![*int(2), *int(3)]));
    assert_eq!(
        expr("new Point(1, 2);"),
        Expr::StructNew("Point".to_string(), vec![*int(1), *int(2)])
    );
}

#[test]
fn array_literal_nests() {
    assert_eq!(
        expr("x = {{1}, {2}};"),
        Expr::Assign(
            "x".to_string(),
            Box::new(Expr::ArrayLiteral(vec![
                Expr::ArrayLiteral(vec![*int(1)]),
                Expr::ArrayLiteral(vec![*int(2)]),
            ]))
        )
    );
}

#[test]
fn null_literal() {
    assert_eq!(expr("null;"), Expr::Literal(Literal::Null));
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

#[test]
fn variable_declaration() {
    assert_eq!(
        parse("int x = 5;"),
        vec![Stmt::VarDecl(VarDecl {
            exported: false,
            ty: scalar(TypeName::Int),
            name: "x".to_string(),
            init: Some(*int(5)),
        })]
    );
}

#[test]
fn array_type_ranks() {
    let stmts = parse("int[] a; float[,] b; char[,,] c;");
    let ranks: Vec<usize> = stmts
        .iter()
        .map(|s| match s {
            Stmt::VarDecl(d) => d.ty.dims,
            other => panic!("expected a declaration, got {:?}", other),
        })
        .collect();
    assert_eq!(ranks, vec![1, 2, 3]);
}

#[test]
fn user_typed_declaration_uses_lookahead() {
    assert_eq!(
        parse("Point p;"),
        vec![Stmt::VarDecl(VarDecl {
            exported: false,
            ty: scalar(TypeName::Named("Point".to_string())),
            name: "p".to_string(),
            init: None,
        })]
    );
}

#[test]
fn function_declaration() {
    let stmts = parse("int add(int a, float b) { return a; }");
    let Stmt::FunctionDecl(decl) = &stmts[0] else {
        panic!("expected a function, got {:?}", stmts[0]);
    };
    assert_eq!(decl.name, "add");
    assert_eq!(decl.ret, scalar(TypeName::Int));
    assert_eq!(
        decl.params,
        vec![
            Param { ty: scalar(TypeName::Int), name: "a".to_string() },
            Param { ty: scalar(TypeName::Float), name: "b".to_string() },
        ]
    );
    assert_eq!(decl.body, vec![Stmt::Return(Some(Expr::Variable("a".to_string())))]);
}

#[test]
fn struct_with_fields_methods_and_constructor() {
    let stmts = parse(
        "struct P { int x; float y = 1.5; P(int x0) { x = x0; } int getX() { return x; } }",
    );
    let Stmt::StructDecl(decl) = &stmts[0] else {
        panic!("expected a struct, got {:?}", stmts[0]);
    };
    assert_eq!(decl.name, "P");
    let fields: Vec<&str> = decl.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(fields, vec!["x", "y"]);
    assert_eq!(decl.fields[1].init, Some(Expr::Literal(Literal::Float(1.5))));
    assert_eq!(decl.methods.len(), 1);
    assert_eq!(decl.methods[0].name, "getX");
    assert_eq!(decl.constructor.as_ref().map(|c| c.params.len()), Some(1));
}

#[test]
fn void_named_constructor() {
    let stmts = parse("class C { void C() { } }");
    let Stmt::ClassDecl(decl) = &stmts[0] else {
        panic!("expected a class, got {:?}", stmts[0]);
    };
    assert!(decl.constructor.is_some());
    assert!(decl.methods.is_empty());
}

#[test]
fn duplicate_constructor_fails() {
    assert!(parse_error("struct S { S() { } S() { } }").contains("already has a constructor"));
}

#[test]
fn for_with_empty_clauses() {
    let stmts = parse("for (;;) { }");
    assert_eq!(
        stmts,
        vec![Stmt::For {
            init: None,
            cond: None,
            step: None,
            body: Box::new(Stmt::Block(Vec::new())),
        }]
    );
}

// ---------------------------------------------------------------------------
// Modules
// ---------------------------------------------------------------------------

#[test]
fn plain_and_aliased_imports() {
    assert_eq!(
        parse("import \"lib/math.ks\"; import as m from \"m.ks\";"),
        vec![
            Stmt::Import { path: "lib/math.ks".to_string(), alias: None },
            Stmt::Import { path: "m.ks".to_string(), alias: Some("m".to_string()) },
        ]
    );
}

#[test]
fn exports_mark_declarations() {
    let stmts = parse("export int x = 1; export void f() { } export struct S { }");
    assert!(matches!(&stmts[0], Stmt::VarDecl(d) if d.exported));
    assert!(matches!(&stmts[1], Stmt::FunctionDecl(f) if f.exported));
    assert!(matches!(&stmts[2], Stmt::StructDecl(s) if s.exported));
}

#[test]
fn export_of_statement_fails() {
    assert!(parse_error("export return;").contains("can be exported"));
}

#[test]
fn errors_report_position() {
    let err = parse_error("int x = ;");
    assert!(err.starts_with("error[1:9]"), "{}", err);
}

#[test]
fn declarations_share_bodies_by_rc() {
    let stmts = parse("void f() { }");
    let Stmt::FunctionDecl(decl) = &stmts[0] else {
        panic!("expected a function");
    };
    let shared = Rc::clone(decl);
    assert_eq!(Rc::strong_count(&shared), 2);
}
