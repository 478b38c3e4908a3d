//! Printer integration tests: printed declaration text re-parses cleanly and
//! printing is a fixed point.

use dtsroll_emitter::DeclarationPrinter;
use dtsroll_parser::ParserState;

fn print_clean(source: &str) -> String {
    let mut parser = ParserState::new("input.d.ts".to_string(), source.to_string());
    let root = parser.parse_source_file();
    assert!(
        parser.get_diagnostics().is_empty(),
        "unexpected diagnostics: {:?}\n{source}",
        parser.get_diagnostics()
    );
    let arena = parser.into_arena();
    DeclarationPrinter::new(&arena).print_source_file(root)
}

const LIBRARY: &str = r#"
import { EventEmitter } from "events";
import type * as fs from "fs";

/** A value or a promise of one. */
export type Awaitable<T> = T | Promise<T>;

export interface Options {
    /** Root directory. */
    readonly root: string;
    filter?: (path: string) => boolean;
    [extra: string]: unknown;
}

export declare class Watcher<T = string> extends EventEmitter implements Disposable {
    private handle;
    protected readonly options: Options;
    static create<T>(options?: Options): Watcher<T>;
    constructor(options: Options);
    on(event: "change", listener: (path: T) => void): this;
    get closed(): boolean;
    set closed(value: boolean);
    dispose(): void;
}

export declare enum Mode {
    Fast = 0,
    Safe = 1
}

export declare namespace Watcher {
    interface Event {
        kind: Mode;
    }
    const version: string;
}

export declare function watch(root: string, options?: Partial<Options>): Watcher;
export declare function isWatcher(value: unknown): value is Watcher;
export declare const DEFAULTS: Readonly<Options>;
export type Handler<K extends keyof Options = keyof Options> = { [P in K]: (value: Options[P]) => void; };
export type Unwrap<T> = T extends Awaitable<infer U> ? U : never;
export type Stat = ReturnType<typeof fs.statSync>;
export { watch as default };
"#;

#[test]
fn printed_library_reparses_without_diagnostics() {
    let printed = print_clean(LIBRARY);
    let reprinted = print_clean(&printed);
    assert_eq!(printed, reprinted);
}

#[test]
fn printed_library_keeps_every_declaration() {
    let printed = print_clean(LIBRARY);
    for needle in [
        "import { EventEmitter } from \"events\";",
        "import type * as fs from \"fs\";",
        "/** A value or a promise of one. */\nexport type Awaitable<T> = T | Promise<T>;",
        "    /** Root directory. */\n    readonly root: string;",
        "export declare class Watcher<T = string> extends EventEmitter implements Disposable {",
        "    private handle;",
        "    static create<T>(options?: Options): Watcher<T>;",
        "    on(event: \"change\", listener: (path: T) => void): this;",
        "    set closed(value: boolean);",
        "export declare enum Mode {\n    Fast = 0,\n    Safe = 1\n}",
        "export declare namespace Watcher {\n    interface Event {\n        kind: Mode;\n    }\n    const version: string;\n}",
        "export declare function isWatcher(value: unknown): value is Watcher;",
        "export type Handler<K extends keyof Options = keyof Options> = { [P in K]: (value: Options[P]) => void; };",
        "export type Unwrap<T> = T extends Awaitable<infer U> ? U : never;",
        "export { watch as default };",
    ] {
        assert!(printed.contains(needle), "missing {needle:?} in:\n{printed}");
    }
}

#[test]
fn loosely_typed_source_prints_as_declarations() {
    let source = r#"
export class Counter {
    count = 0;
    increment(by: number = 1): number {
        this.count += by;
        return this.count;
    }
}
export function makeCounter(): Counter {
    return new Counter();
}
"#;
    assert_eq!(
        print_clean(source),
        "export class Counter {\n    count;\n    increment(by?: number): number;\n}\nexport function makeCounter(): Counter;\n"
    );
}
