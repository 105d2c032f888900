//! Prompt construction for Flutter source generation.
//!
//! The prompt asks for a single `lib/main.dart` and forces the generated app
//! to carry the trial/license block below, with the trial length substituted.

const TRIAL_DAYS_PLACEHOLDER: &str = "{{TRIAL_DAYS}}";

const LICENSE_MANAGER_TEMPLATE: &str = r#"import 'package:shared_preferences/shared_preferences.dart';
import 'package:crypto/crypto.dart';
import 'dart:convert';

enum LicenseStatus { trial, licensed, expired }

class LicenseManager {
  static const String _firstRunKey = 'first_run_date';
  static const String _licenseKey = 'license_key';
  static const int _trialDays = {{TRIAL_DAYS}};

  static Future<LicenseStatus> checkLicense() async {
    final prefs = await SharedPreferences.getInstance();

    final storedLicense = prefs.getString(_licenseKey);
    if (storedLicense != null && _validateLicense(storedLicense)) {
      return LicenseStatus.licensed;
    }

    final firstRunStr = prefs.getString(_firstRunKey);
    final now = DateTime.now();

    if (firstRunStr == null) {
      await prefs.setString(_firstRunKey, now.toIso8601String());
      return LicenseStatus.trial;
    }

    final firstRun = DateTime.parse(firstRunStr);
    final difference = now.difference(firstRun).inDays;

    if (difference < _trialDays) {
      return LicenseStatus.trial;
    }

    return LicenseStatus.expired;
  }

  static Future<int> getDaysRemaining() async {
    final prefs = await SharedPreferences.getInstance();
    final firstRunStr = prefs.getString(_firstRunKey);

    if (firstRunStr == null) return _trialDays;

    final firstRun = DateTime.parse(firstRunStr);
    final difference = DateTime.now().difference(firstRun).inDays;
    final remaining = _trialDays - difference;

    return remaining > 0 ? remaining : 0;
  }

  static Future<bool> activateLicense(String licenseKey) async {
    if (!_validateLicense(licenseKey)) {
      return false;
    }

    final prefs = await SharedPreferences.getInstance();
    await prefs.setString(_licenseKey, licenseKey);
    return true;
  }

  static bool _validateLicense(String license) {
    final clean = license.replaceAll('-', '').toUpperCase();
    if (clean.length != 16) return false;

    final data = clean.substring(0, 12);
    final checksum = clean.substring(12);

    final hash = sha256.convert(utf8.encode(data)).toString();
    final expectedChecksum = hash.substring(0, 4).toUpperCase();

    return checksum == expectedChecksum;
  }
}

class TrialBanner extends StatelessWidget {
  const TrialBanner({Key? key}) : super(key: key);

  @override
  Widget build(BuildContext context) {
    return FutureBuilder<int>(
      future: LicenseManager.getDaysRemaining(),
      builder: (context, snapshot) {
        if (!snapshot.hasData) return const SizedBox.shrink();

        final days = snapshot.data!;

        return Container(
          width: double.infinity,
          padding: const EdgeInsets.all(12),
          color: Colors.orange.shade700,
          child: Row(
            mainAxisAlignment: MainAxisAlignment.center,
            children: [
              const Icon(Icons.access_time, color: Colors.white, size: 20),
              const SizedBox(width: 8),
              Text(
                'Trial: $days ${days == 1 ? 'dia restante' : 'dias restantes'}',
                style: const TextStyle(
                  color: Colors.white,
                  fontWeight: FontWeight.bold,
                ),
              ),
            ],
          ),
        );
      },
    );
  }
}

class LicenseBlockScreen extends StatefulWidget {
  const LicenseBlockScreen({Key? key}) : super(key: key);

  @override
  State<LicenseBlockScreen> createState() => _LicenseBlockScreenState();
}

class _LicenseBlockScreenState extends State<LicenseBlockScreen> {
  final _licenseController = TextEditingController();
  bool _isLoading = false;
  String? _errorMessage;

  Future<void> _activateLicense() async {
    setState(() {
      _isLoading = true;
      _errorMessage = null;
    });

    final success = await LicenseManager.activateLicense(_licenseController.text);

    setState(() => _isLoading = false);

    if (success) {
      Navigator.of(context).pushReplacement(
        MaterialPageRoute(builder: (_) => const MyApp(licenseStatus: LicenseStatus.licensed)),
      );
    } else {
      setState(() => _errorMessage = 'Chave de licença inválida');
    }
  }

  @override
  Widget build(BuildContext context) {
    return Scaffold(
      body: Center(
        child: Padding(
          padding: const EdgeInsets.all(24.0),
          child: Column(
            mainAxisAlignment: MainAxisAlignment.center,
            children: [
              Icon(Icons.lock_outline, size: 80, color: Colors.red.shade400),
              const SizedBox(height: 24),
              const Text(
                'Período de Trial Expirado',
                style: TextStyle(fontSize: 24, fontWeight: FontWeight.bold),
                textAlign: TextAlign.center,
              ),
              const SizedBox(height: 16),
              const Text(
                'Para continuar usando este aplicativo, insira uma chave de licença válida.',
                textAlign: TextAlign.center,
                style: TextStyle(color: Colors.grey),
              ),
              const SizedBox(height: 32),
              TextField(
                controller: _licenseController,
                decoration: InputDecoration(
                  labelText: 'Chave de Licença',
                  hintText: 'XXXX-XXXX-XXXX-XXXX',
                  border: const OutlineInputBorder(),
                  errorText: _errorMessage,
                ),
                textAlign: TextAlign.center,
                style: const TextStyle(letterSpacing: 2),
              ),
              const SizedBox(height: 24),
              SizedBox(
                width: double.infinity,
                child: ElevatedButton(
                  onPressed: _isLoading ? null : _activateLicense,
                  style: ElevatedButton.styleFrom(
                    padding: const EdgeInsets.all(16),
                  ),
                  child: _isLoading
                      ? const SizedBox(
                          height: 20,
                          width: 20,
                          child: CircularProgressIndicator(strokeWidth: 2),
                        )
                      : const Text('Ativar Licença'),
                ),
              ),
            ],
          ),
        ),
      ),
    );
  }

  @override
  void dispose() {
    _licenseController.dispose();
    super.dispose();
  }
}"#;

/// Returns the license/trial Dart block with `trial_days` substituted.
pub fn license_manager_code(trial_days: u32) -> String {
    LICENSE_MANAGER_TEMPLATE.replace(TRIAL_DAYS_PLACEHOLDER, &trial_days.to_string())
}

/// Builds the generation prompt for an app description.
///
/// Pure and deterministic: the same inputs always produce the same text.
pub fn build_prompt(app_description: &str, trial_days: u32) -> String {
    format!(
        "Atue como um desenvolvedor Flutter sênior com 10+ anos de experiência.

Gere EXCLUSIVAMENTE o conteúdo do arquivo lib/main.dart completo e funcional.

NÃO gere:
* Projeto Flutter completo
* Pastas android/, ios/, web/, windows/
* Arquivos Gradle, Kotlin ou configurações nativas
* Instruções de build ou compilação
* Código em markdown (```dart ou ```)

O código DEVE:
* Ser compatível com Flutter stable atual
* Funcionar quando colado em um projeto criado com: flutter create nome_do_app
* Usar Material Design 3
* Ter código limpo, organizado e profissional
* Usar StatefulWidget/StatelessWidget apropriadamente
* Implementar todas as funcionalidades descritas (nada de placeholders ou TODOs)
* Usar apenas Flutter SDK padrão + dependências declaradas

SISTEMA DE TRIAL / LICENÇA (OBRIGATÓRIO):

Considere que o projeto já terá no pubspec.yaml:
dependencies:
  shared_preferences: ^2.2.2
  crypto: ^3.0.3

NÃO altere pubspec.yaml. NÃO gere código fora do main.dart.

Copie EXATAMENTE este código no início do arquivo (após os imports Flutter):

{license_manager}

INTEGRAÇÃO OBRIGATÓRIA:

1. Use este main():
void main() async {{
  WidgetsFlutterBinding.ensureInitialized();
  final licenseStatus = await LicenseManager.checkLicense();
  runApp(MyApp(licenseStatus: licenseStatus));
}}

2. O MaterialApp deve usar:
home: licenseStatus == LicenseStatus.expired
  ? LicenseBlockScreen()
  : HomeScreen(licenseStatus: licenseStatus)

3. Se estiver em trial, exibir TrialBanner no topo da HomeScreen

4. O período de trial é de {trial_days} dias

APP SOLICITADO:
{app_description}

IMPORTANTE:
* Gere APENAS código Dart válido
* Gere UM ÚNICO ARQUIVO main.dart completo
* NÃO use markdown backticks (```dart ou ```)
* NÃO adicione explicações ou comentários desnecessários
* Responda SOMENTE com o código

Responda APENAS com o código completo do main.dart, SEM qualquer formatação markdown.",
        license_manager = license_manager_code(trial_days),
        trial_days = trial_days,
        app_description = app_description.trim(),
    )
}
