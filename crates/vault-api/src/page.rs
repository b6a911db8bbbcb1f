//! Browser page
//!
//! Self-contained HTML/JS page. It renders the session, posts the user's
//! actions to the API, and answers wallet bridge requests through a CIP-30
//! wallet driven by Mesh.

use hello_validator::ContractInfo;
use vault_core::constants::LOVELACE_PER_ADA;

/// Mesh build loaded by the page
const MESH_MODULE: &str = "https://esm.sh/@meshsdk/core@1.5.18";

/// Render the page for the loaded contract
///
/// The page will:
/// 1. Reset the session with `POST /session/reset`, so nothing from an earlier
///    page load survives, and list the CIP-30 wallets under `window.cardano`
/// 2. Connect through `POST /wallet/connect`, answering the bridge's connect
///    and address requests
/// 3. Start lock and unlock flows with `POST /session/lock|unlock`
/// 4. Build, sign and submit the bridge's transaction intents with Mesh
/// 5. Render `GET /session` once a second, offering "Start over" whenever the
///    session is not idle
pub fn render_page(info: &ContractInfo) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Hello plu-ts</title>
    <style>
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: linear-gradient(135deg, #1a1a2e 0%, #16213e 100%);
            min-height: 100vh;
            display: flex;
            align-items: center;
            justify-content: center;
            color: #fff;
        }}
        .container {{
            background: rgba(255,255,255,0.05);
            border-radius: 16px;
            padding: 40px;
            max-width: 520px;
            width: 90%;
            text-align: center;
            border: 1px solid rgba(255,255,255,0.1);
        }}
        h1 {{ font-size: 24px; margin-bottom: 8px; }}
        .subtitle {{ color: rgba(255,255,255,0.7); margin-bottom: 24px; font-size: 14px; }}
        .mono {{
            font-family: monospace; font-size: 11px;
            background: rgba(0,0,0,0.3);
            padding: 8px 12px; border-radius: 4px;
            margin: 8px 0; word-break: break-all;
        }}
        .status {{
            padding: 16px;
            border-radius: 8px;
            margin: 16px 0;
            font-size: 15px;
        }}
        .status.idle {{ background: rgba(255,255,255,0.05); }}
        .status.loading {{ background: rgba(59, 130, 246, 0.2); border: 1px solid rgba(59, 130, 246, 0.3); }}
        .status.success {{ background: rgba(34, 197, 94, 0.2); border: 1px solid rgba(34, 197, 94, 0.3); }}
        .status.error {{ background: rgba(239, 68, 68, 0.2); border: 1px solid rgba(239, 68, 68, 0.3); }}
        .row {{ display: flex; gap: 8px; justify-content: center; margin: 12px 0; }}
        select {{ padding: 10px; border-radius: 8px; font-size: 15px; }}
        button {{
            background: #3b82f6; color: white; border: none;
            padding: 12px 24px; border-radius: 8px;
            font-size: 16px; cursor: pointer; transition: background 0.2s;
        }}
        button:hover {{ background: #2563eb; }}
        button:disabled {{ background: #475569; cursor: not-allowed; }}
        .hidden {{ display: none; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>Hello plu-ts</h1>
        <p class="subtitle">Lock {ada} ADA for your key, unlock it with "{redeemer}" ({network})</p>
        <div class="mono" id="script-address"></div>
        <div class="row" id="connect-row">
            <select id="wallet-select"></select>
            <button id="connect-btn">Connect</button>
        </div>
        <div class="mono hidden" id="wallet-address"></div>
        <div class="row">
            <button id="lock-btn" disabled>Lock</button>
            <button id="unlock-btn" disabled>Unlock</button>
        </div>
        <div id="status" class="status idle"><span id="status-text">Connect a wallet to start</span></div>
        <div class="mono hidden" id="tx-hash"></div>
        <div class="row hidden" id="pending-actions">
            <button id="cancel-btn">Stop waiting</button>
        </div>
        <div class="row hidden" id="reset-row">
            <button id="reset-btn">Start over</button>
        </div>
    </div>
    <script type="module">
        import {{ BrowserWallet, Transaction }} from "{mesh}";

        const SCRIPT_ADDRESS = "{script_address}";
        const POLL_MS = 500;

        const $ = (id) => document.getElementById(id);
        let wallet = null;
        let walletName = null;

        $('script-address').textContent = SCRIPT_ADDRESS;

        function setStatus(text, type) {{
            $('status-text').textContent = text;
            $('status').className = 'status ' + type;
        }}

        async function api(method, path) {{
            const response = await fetch(path, {{ method }});
            const body = response.status === 204 ? null : await response.json();
            if (!response.ok) throw new Error(body && body.message ? body.message : response.statusText);
            return body;
        }}

        function listWallets() {{
            const select = $('wallet-select');
            const names = Object.keys(window.cardano || {{}})
                .filter((k) => window.cardano[k] && typeof window.cardano[k].enable === 'function');
            select.innerHTML = '';
            for (const name of names) {{
                const option = document.createElement('option');
                option.value = name;
                option.textContent = window.cardano[name].name || name;
                select.appendChild(option);
            }}
            if (names.length === 0) setStatus('No CIP-30 wallet detected', 'error');
        }}

        // Mesh transaction from the bridge's intent
        async function buildTx(intent) {{
            const tx = new Transaction({{ initiator: wallet }});
            for (const input of intent.scriptInputs) {{
                tx.redeemValue({{
                    value: input.utxo,
                    script: input.script,
                    // Inline datums are read from the spent output itself
                    datum: input.utxo.output.plutusData ? input.utxo : input.datum,
                    redeemer: {{ data: input.redeemer }},
                }});
            }}
            for (const output of intent.outputs) {{
                const recipient = output.datum
                    ? {{ address: output.address, datum: {{ value: output.datum.value, inline: output.datum.inline }} }}
                    : output.address;
                tx.sendAssets(recipient, output.amount);
            }}
            if (intent.requiredSigners.length > 0) {{
                tx.setRequiredSigners([intent.changeAddress || (await wallet.getChangeAddress())]);
            }}
            if (intent.changeAddress) tx.setChangeAddress(intent.changeAddress);
            return tx.build();
        }}

        async function answer(request) {{
            switch (request.kind) {{
                case 'connect':
                    wallet = await BrowserWallet.enable(walletName);
                    return {{ name: walletName }};
                case 'used_addresses':
                    return await wallet.getUsedAddresses();
                case 'sign_tx':
                    setStatus('Please approve the transaction in your wallet...', 'loading');
                    return await wallet.signTx(await buildTx(request.unsigned_tx), request.partial_sign);
                case 'submit_tx':
                    return (await wallet.submitTx(request.signed_tx.cbor)) || null;
                default:
                    throw new Error('unknown request ' + request.kind);
            }}
        }}

        async function bridgeLoop() {{
            for (;;) {{
                try {{
                    const request = await api('GET', '/bridge/next');
                    if (request) {{
                        let reply;
                        try {{
                            reply = {{ ok: await answer(request) }};
                        }} catch (error) {{
                            console.error('Wallet error:', error);
                            reply = {{ error: error.info || error.message || String(error) }};
                        }}
                        await fetch('/bridge/respond/' + request.id, {{
                            method: 'POST',
                            headers: {{ 'Content-Type': 'application/json' }},
                            body: JSON.stringify(reply),
                        }});
                        continue;
                    }}
                }} catch (error) {{
                    console.error('Bridge poll failed:', error);
                }}
                await new Promise((r) => setTimeout(r, POLL_MS));
            }}
        }}

        function render(session) {{
            // A wallet the server remembers is useless without its enabled API here
            const connected = !!session.wallet && wallet !== null;
            const busy = ['locking', 'locking-confirming', 'unlocking', 'unlocking-confirming'].includes(session.state);
            $('lock-btn').disabled = !connected || !['init', 'unlocked'].includes(session.state);
            $('unlock-btn').disabled = !connected || !['init', 'locked'].includes(session.state);
            $('pending-actions').classList.toggle('hidden', !session.state.endsWith('-confirming'));
            $('reset-row').classList.toggle('hidden', session.state === 'init' && !session.lastError);

            $('connect-row').classList.toggle('hidden', connected);
            $('wallet-address').classList.toggle('hidden', !connected);
            if (connected) $('wallet-address').textContent = session.wallet.address;
            if (session.lastTxHash) {{
                $('tx-hash').textContent = session.lastTxHash;
                $('tx-hash').classList.remove('hidden');
            }} else {{
                $('tx-hash').classList.add('hidden');
            }}

            if (session.lastError) setStatus(session.lastError, 'error');
            else if (session.status) setStatus(session.status, busy ? 'loading' : 'success');
            else if (connected) setStatus('Ready', 'idle');
        }}

        async function refresh() {{
            try {{
                render(await api('GET', '/session'));
            }} catch (error) {{
                console.error('Session poll failed:', error);
            }}
        }}

        async function act(path) {{
            try {{
                await api('POST', path);
            }} catch (error) {{
                setStatus(error.message, 'error');
            }}
            refresh();
        }}

        $('connect-btn').onclick = async () => {{
            walletName = $('wallet-select').value;
            if (!walletName) return;
            setStatus('Please approve the connection in your wallet...', 'loading');
            await act('/wallet/connect');
        }};
        $('lock-btn').onclick = () => act('/session/lock');
        $('unlock-btn').onclick = () => act('/session/unlock');
        $('cancel-btn').onclick = () => act('/session/cancel');
        $('reset-btn').onclick = async () => {{
            wallet = null;
            walletName = null;
            await act('/session/reset');
            setStatus('Connect a wallet to start', 'idle');
        }};

        async function start() {{
            try {{
                await api('POST', '/session/reset');
            }} catch (error) {{
                console.error('Session reset failed:', error);
            }}
            listWallets();
            bridgeLoop();
            refresh();
            setInterval(refresh, 1000);
        }}
        start();
    </script>
</body>
</html>"#,
        ada = format_ada(info.lock_amount),
        redeemer = escape_js_string(&info.redeemer),
        network = info.network.as_str(),
        script_address = escape_js_string(info.script_address.as_str()),
        mesh = MESH_MODULE,
    )
}

/// Lovelace as a decimal ADA string without trailing zeros
fn format_ada(lovelace: u64) -> String {
    let whole = lovelace / LOVELACE_PER_ADA;
    let frac = lovelace % LOVELACE_PER_ADA;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:06}", frac);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// Escape string for safe use in JavaScript and HTML text
fn escape_js_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
}
